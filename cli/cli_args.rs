use clap::{ArgMatches, Parser};
use clap_complete::Shell;
use gpt_copy_core::{Rule, RuleKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gpt-copy",
    author,
    version,
    about = "Concatenate a directory tree into one markdown document for LLM prompts.",
    long_about = "gpt-copy walks a directory, filters it through git and ordered include/exclude \nrules, and writes a folder diagram followed by the content of every visible file.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  gpt-copy . -e 'target/' -e '*.lock'\n  gpt-copy -i 'src/**/*.rs' -o context.md\n  gpt-copy --tokens --top-n 10\n\nRules apply in command-line order; the last matching rule wins."
)]
pub struct Cli {
    #[arg(
        value_name = "ROOT_PATH",
        help = "Directory to scan (default: $GPT_COPY_ROOT or the current directory)."
    )]
    pub root_path: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write the document to FILE instead of stdout.",
        help_heading = "Output Control"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Only output the folder structure.",
        help_heading = "Output Control"
    )]
    pub tree_only: bool,

    #[arg(
        long,
        help = "Output the folder structure annotated with token counts.",
        help_heading = "Output Control"
    )]
    pub tokens: bool,

    #[arg(
        long,
        value_name = "N",
        help = "With --tokens, list the N files with the most tokens instead of the tree.",
        help_heading = "Output Control"
    )]
    pub top_n: Option<usize>,

    #[arg(
        long,
        help = "Do not prefix file content with line numbers.",
        help_heading = "Output Control"
    )]
    pub no_number: bool,

    #[arg(short = 'i', long, value_name = "PATTERN", action = clap::ArgAction::Append, help = "Include paths matching PATTERN.", help_heading = "Filtering")]
    pub include: Vec<String>,

    #[arg(short = 'e', long, value_name = "PATTERN", action = clap::ArgAction::Append, help = "Exclude paths matching PATTERN.", help_heading = "Filtering")]
    pub exclude: Vec<String>,

    #[arg(long, value_name = "NAME", action = clap::ArgAction::Append, help = "Exclude directories named NAME (same as -e 'NAME/').", help_heading = "Filtering")]
    pub exclude_dir: Vec<String>,

    #[arg(
        short,
        long,
        help = "Ignore git tracking and .gitignore files.",
        help_heading = "Filtering"
    )]
    pub force: bool,

    #[arg(
        long,
        value_name = "FILE",
        help = "Use this TOML config file (default: .gpt-copy.toml in ROOT_PATH).",
        conflicts_with = "no_config",
        help_heading = "Configuration"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        help = "Do not load any TOML config file.",
        conflicts_with = "config",
        help_heading = "Configuration"
    )]
    pub no_config: bool,

    #[arg(
        long,
        value_enum,
        value_name = "SHELL",
        help = "Print a shell completion script and exit.",
        help_heading = "Configuration"
    )]
    pub completions: Option<Shell>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv, -vvv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence log messages and warnings.")]
    pub quiet: bool,
}

/// Rules from `-i`, `-e` and `--exclude-dir`, in the order they were
/// typed on the command line.
pub fn rules_from_matches(matches: &ArgMatches) -> Vec<Rule> {
    let mut indexed: Vec<(usize, Rule)> = Vec::new();
    for (id, kind) in [
        ("include", RuleKind::Include),
        ("exclude", RuleKind::Exclude),
        ("exclude_dir", RuleKind::ExcludeDir),
    ] {
        let (Some(indices), Some(values)) =
            (matches.indices_of(id), matches.get_many::<String>(id))
        else {
            continue;
        };
        indexed.extend(
            indices
                .zip(values)
                .map(|(index, pattern)| (index, Rule::new(kind, pattern))),
        );
    }
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, rule)| rule).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn rules_for(args: &[&str]) -> Vec<Rule> {
        let matches = Cli::command().try_get_matches_from(args).unwrap();
        rules_from_matches(&matches)
    }

    #[test]
    fn rules_keep_command_line_order() {
        let rules = rules_for(&[
            "gpt-copy",
            "-e",
            "build/**",
            "-i",
            "build/reports/**",
            "--exclude-dir",
            "node_modules",
            "-e",
            "**/*.log",
        ]);
        assert_eq!(
            rules,
            vec![
                Rule::exclude("build/**"),
                Rule::include("build/reports/**"),
                Rule::exclude_dir("node_modules"),
                Rule::exclude("**/*.log"),
            ]
        );
    }

    #[test]
    fn no_rule_flags_gives_no_rules() {
        assert!(rules_for(&["gpt-copy", "."]).is_empty());
    }

    #[test]
    fn config_flags_conflict() {
        let result =
            Cli::command().try_get_matches_from(["gpt-copy", "--config", "a.toml", "--no-config"]);
        assert!(result.is_err());
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
