use crate::cli_args::Cli;
use crate::output;
use anyhow::{Context, Result};
use gpt_copy_core::rules::apply_implicit_whitelist;
use gpt_copy_core::{
    Config, FilterEngine, IgnoreSettings, IgnoreSource, MarkdownOptions, MatchTracker,
    ProjectContext, Rule, Walker, generate_tree, render_markdown,
};
use std::path::{Path, PathBuf};

pub fn handle_generate_command(cli: &Cli, cli_rules: Vec<Rule>, quiet: bool) -> Result<()> {
    let scan_root = Config::determine_scan_root(cli.root_path.as_ref())
        .context("Failed to determine scan root")?;
    log::info!("Scan root determined: {}", scan_root.display());

    let config = load_config(&scan_root, cli).context("Failed to load configuration")?;

    let mut user_rules = config.rules();
    user_rules.extend(cli_rules);
    let mut rules = user_rules.clone();
    apply_implicit_whitelist(&mut rules);
    log::debug!("Effective rules: {:?}", rules);

    let settings = if cli.force {
        log::info!("--force given; skipping git and .gitignore filtering");
        IgnoreSettings {
            use_git: false,
            use_gitignore: false,
        }
    } else {
        config.ignore_settings()
    };
    let ignore = IgnoreSource::detect(&scan_root, settings);
    let engine = FilterEngine::new(rules);
    let output_path = cli.output.as_deref().map(resolve_output_path);

    let mut tracker = MatchTracker::new();
    let mut walker = Walker::new(&scan_root, &ignore, &engine);
    if let Some(path) = &output_path {
        walker = walker.skip_path(path.clone());
    }
    let file_infos = walker.collect(&mut tracker);

    let with_tokens = cli.tokens || config.tokens.enabled;
    let top_n = cli.top_n.or(config.tokens.top_n);
    if top_n.is_some() && !with_tokens {
        log::info!("--top-n has no effect without --tokens");
    }
    let tree_only = cli.tree_only || config.output.tree_only;

    let document = if with_tokens {
        generate_tree(&scan_root, &file_infos, true, top_n)
    } else if tree_only {
        generate_tree(&scan_root, &file_infos, false, None)
    } else {
        let tree = generate_tree(&scan_root, &file_infos, false, None);
        let context = ProjectContext::build(&file_infos, tree);
        if !quiet {
            output::print_read_errors(&context.read_errors);
        }
        let options = MarkdownOptions {
            line_numbers: config.output.line_numbers && !cli.no_number,
        };
        render_markdown(&context, &options)
    };

    output::write_output(&document, output_path.as_deref(), quiet)?;

    if !quiet {
        output::print_unmatched_patterns(&tracker.unmatched(&user_rules));
    }
    Ok(())
}

fn load_config(scan_root: &Path, cli: &Cli) -> Result<Config> {
    let config_path = Config::resolve_config_path(scan_root, cli.config.as_ref(), cli.no_config)
        .context("Failed to resolve configuration path")?;
    match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Absolute form of the output path, with its directory canonicalized so
/// it compares equal to the walker's paths under the canonical root.
fn resolve_output_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let Some(name) = absolute.file_name().map(ToOwned::to_owned) else {
        return absolute;
    };
    match absolute.parent().map(Path::canonicalize) {
        Some(Ok(dir)) => dir.join(name),
        _ => absolute,
    }
}
