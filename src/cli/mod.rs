pub mod args_comment;
pub mod commands;

pub use args_comment::{args_comment, args_from_file, split_args, ARGS_COMMENT_PREFIX};
pub use commands::CliArgs;
