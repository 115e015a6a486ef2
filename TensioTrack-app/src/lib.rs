// TensioTrack terminal front end
//
// Command line arguments, shell command parsing, screen rendering and the
// interactive loop tying the session gate to the screens.

pub mod cli;
pub mod render;
pub mod shell;

pub use cli::Args;
pub use render::{Page, Renderer};
pub use shell::{shared_lines, App, Flow, PromptConfirmation};
