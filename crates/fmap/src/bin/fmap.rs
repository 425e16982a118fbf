//! fmap - Short alias for format-mapper.
//!
//! Delegates to the format-mapper implementation.

fn main() -> std::process::ExitCode {
    fmap::cmd::map_cmd::main_with_name("fmap")
}
