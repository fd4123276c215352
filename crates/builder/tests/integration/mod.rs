mod descriptor;
mod packaging;
mod phases;
mod pipeline;
mod support;
