//! Zstandard compression of package archives

use pkgdesc_errors::Error;
use std::path::Path;

/// Compress a tar file using Zstandard at `level`
///
/// # Errors
///
/// Returns an error if file I/O operations fail or compression fails.
pub async fn compress_with_zstd(level: i32, tar_path: &Path, output_path: &Path) -> Result<(), Error> {
    use async_compression::tokio::write::ZstdEncoder;
    use async_compression::Level;
    use tokio::fs::File;
    use tokio::io::{AsyncWriteExt, BufReader};

    let input_file = File::open(tar_path)
        .await
        .map_err(|e| Error::io_with_path(&e, tar_path))?;
    let output_file = File::create(output_path)
        .await
        .map_err(|e| Error::io_with_path(&e, output_path))?;

    let mut encoder = ZstdEncoder::with_quality(output_file, Level::Precise(level));

    let mut reader = BufReader::new(input_file);
    tokio::io::copy(&mut reader, &mut encoder).await?;

    // Flush the final frame
    encoder.shutdown().await?;

    Ok(())
}
