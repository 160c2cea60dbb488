//! sceneforge editor shell
//!
//! Opens a winit window, builds the demo scene and runs the editor loop.
//! Configuration is read from the file named by `SCENEFORGE_CONFIG`.

fn main() {
    sceneforge::app::run();
}
