// Build Tool Command
// Deterministic command-line synthesis for one matrix cell

use crate::execution::matrix::MatrixCell;

use std::fmt;

use serde::Serialize;

/// Build tool invoked when none is configured
pub const DEFAULT_TOOL: &str = "conan";

/// A fully resolved external command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `<tool> create <recipe> --build=missing --version <v> -s &:build_type=<bt>
    /// [-o &:shared=<bool>] -c:a &:tools.build:skip_test=<bool>`
    pub fn for_cell(program: &str, cell: &MatrixCell) -> Self {
        let mut args = vec![
            "create".to_string(),
            cell.recipe_dir.display().to_string(),
            "--build=missing".to_string(),
            "--version".to_string(),
            cell.version.clone(),
            "-s".to_string(),
            format!("&:build_type={}", cell.build_type),
        ];

        if let Some(shared) = cell.linkage.shared_option() {
            args.push("-o".to_string());
            args.push(format!("&:shared={}", python_bool(shared)));
        }

        args.push("-c:a".to_string());
        args.push(format!(
            "&:tools.build:skip_test={}",
            python_bool(!cell.run_tests)
        ));

        Self::new(program, args)
    }

    /// Prefix the command with a host wrapper (`nice -n 10 conan ...`)
    pub fn wrapped(self, prefix: &[String]) -> Self {
        match prefix.split_first() {
            None => self,
            Some((program, rest)) => {
                let mut args = rest.to_vec();
                args.push(self.program);
                args.extend(self.args);
                Self::new(program.clone(), args)
            }
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Recipe options and conf values are Python literals
fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '&' || c == '"') {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}
