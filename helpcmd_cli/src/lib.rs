// Terminal front-end for helpcmd: prompts, rendering and logging setup.

pub mod logging;
pub mod output;
pub mod prompt;
