pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod filter;
pub mod gather;
pub mod ignore_source;
pub mod language;
pub mod output_formats;
pub mod rules;
pub mod tokens;
pub mod tree;

pub use config::Config;
pub use context::{FileSection, ProjectContext};
pub use error::{AppError, Result};
pub use filter::{FilterEngine, MatchTracker};
pub use gather::{CompressedDir, FileInfo, Walker, collect_file_info};
pub use ignore_source::{GitignoreSpecs, IgnoreSettings, IgnoreSource, TrackedFiles};
pub use output_formats::{MarkdownOptions, render_markdown};
pub use rules::{Action, Rule, RuleKind};
pub use tokens::TokenCounter;
pub use tree::{TreeNode, generate_tree};
