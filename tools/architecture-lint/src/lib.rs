//! Repo-local architectural lint for the client crate's hexagonal layers.
//!
//! The client core keeps `domain` (entities, services, ports), `inbound`
//! (screen controllers), and `outbound` (backend and device adapters) apart
//! at the module level. Each layer has a row in [`LAYERS`]:
//!
//! - `domain` may not reach `inbound` or `outbound`, the filesystem, or the
//!   process-setup crates
//! - `inbound` may not reach `outbound` or the filesystem
//! - `outbound` may not reach `inbound` or the process-setup crates
//!
//! Run it with `cargo run -p architecture-lint`.

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use syn::visit::Visit;

/// A single boundary violation discovered by the linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File path relative to `client/src`.
    pub file: PathBuf,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Failure modes returned by the architecture lint.
#[derive(Debug)]
pub enum ArchitectureLintError {
    /// Reading the source tree failed.
    Io(io::Error),
    /// A file could not be parsed or sits outside every layer.
    Parse { file: PathBuf, message: String },
    /// One or more boundary violations were found.
    Violations(Vec<Violation>),
}

impl fmt::Display for ArchitectureLintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "architecture lint could not read sources: {err}"),
            Self::Parse { file, message } => {
                write!(f, "architecture lint rejected {}: {message}", file.display())
            }
            Self::Violations(violations) => {
                writeln!(f, "Architecture boundary violations:")?;
                violations
                    .iter()
                    .try_for_each(|violation| writeln!(f, "- {violation}"))
            }
        }
    }
}

impl std::error::Error for ArchitectureLintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { .. } | Self::Violations(_) => None,
        }
    }
}

impl From<io::Error> for ArchitectureLintError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// A Rust source file to be linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintSource {
    /// Path relative to `client/src`.
    pub file: PathBuf,
    /// File contents.
    pub contents: String,
}

/// What one layer may not depend on.
#[derive(Debug)]
pub struct LayerRules {
    /// Top-level module under `client/src`.
    pub name: &'static str,
    /// Sibling layers this one may not import.
    pub forbidden_layers: &'static [&'static str],
    /// External crates this one may not import.
    pub forbidden_crates: &'static [&'static str],
    /// Whether `std::fs` is allowed.
    pub filesystem: bool,
}

/// Boundary rules for every client layer.
pub static LAYERS: [LayerRules; 3] = [
    LayerRules {
        name: "domain",
        forbidden_layers: &["inbound", "outbound"],
        forbidden_crates: &[
            "clap",
            "color_eyre",
            "ortho_config",
            "tracing_subscriber",
            "cap_std",
            "tempfile",
        ],
        filesystem: false,
    },
    LayerRules {
        name: "inbound",
        forbidden_layers: &["outbound"],
        forbidden_crates: &[
            "clap",
            "color_eyre",
            "ortho_config",
            "tracing_subscriber",
            "cap_std",
            "tempfile",
        ],
        filesystem: false,
    },
    LayerRules {
        name: "outbound",
        forbidden_layers: &["inbound"],
        forbidden_crates: &["clap", "color_eyre", "ortho_config", "tracing_subscriber"],
        filesystem: true,
    },
];

/// Name the client crate goes by in its own tests and binaries.
const CRATE_NAME: &str = "client";

impl LayerRules {
    fn for_file(file: &Path) -> Option<&'static Self> {
        let first = file.components().next()?.as_os_str().to_str()?;
        LAYERS.iter().find(|rules| rules.name == first)
    }

    fn judge(&self, reference: &Reference) -> Option<String> {
        let name = self.name;
        match reference {
            Reference::Layer(root) if self.forbidden_layers.contains(&root.as_str()) => {
                Some(format!("{name} module must not depend on crate::{root}"))
            }
            Reference::Crate(root) if self.forbidden_crates.contains(&root.as_str()) => {
                Some(format!("{name} module must not depend on external crate `{root}`"))
            }
            Reference::StdFs if !self.filesystem => {
                Some(format!("{name} module must not use std::fs"))
            }
            Reference::Layer(_) | Reference::Crate(_) | Reference::StdFs => None,
        }
    }
}

/// Lint the client crate sources on disk.
///
/// `client_dir` must be the `client/` directory at the repository root.
pub fn lint_client_sources(client_dir: &Path) -> Result<(), ArchitectureLintError> {
    let src_dir = Dir::open_ambient_dir(client_dir.join("src"), ambient_authority())?;
    let mut sources = Vec::new();
    for rules in &LAYERS {
        if src_dir.is_dir(rules.name) {
            let layer_dir = src_dir.open_dir(rules.name)?;
            collect_sources(&layer_dir, Path::new(rules.name), &mut sources)?;
        }
    }
    sources.sort_by(|left, right| left.file.cmp(&right.file));
    lint_sources(&sources)
}

/// Lint the provided Rust sources. Intended for unit and behaviour tests.
pub fn lint_sources(sources: &[LintSource]) -> Result<(), ArchitectureLintError> {
    let mut violations = Vec::new();
    for source in sources {
        let rejected = |message: String| ArchitectureLintError::Parse {
            file: source.file.clone(),
            message,
        };
        let rules = LayerRules::for_file(&source.file).ok_or_else(|| {
            rejected("file is outside the domain, inbound, and outbound layers".to_owned())
        })?;
        let parsed = syn::parse_file(&source.contents).map_err(|err| rejected(err.to_string()))?;

        let mut references = ReferenceCollector::default();
        references.visit_file(&parsed);
        let messages: BTreeSet<String> = references
            .found
            .iter()
            .filter_map(|reference| rules.judge(reference))
            .collect();
        violations.extend(messages.into_iter().map(|message| Violation {
            file: source.file.clone(),
            message,
        }));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ArchitectureLintError::Violations(violations))
    }
}

/// Where a path in the source points.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Reference {
    /// A top-level module of the client crate.
    Layer(String),
    /// Another crate, by its root name.
    Crate(String),
    /// `std::fs` or anything under it.
    StdFs,
}

impl Reference {
    fn classify(segments: &[String]) -> Option<Self> {
        let (first, rest) = segments.split_first()?;
        match first.as_str() {
            "crate" | "self" | "super" | CRATE_NAME => rest
                .iter()
                .find(|segment| !matches!(segment.as_str(), "self" | "super"))
                .map(|root| Self::Layer(root.clone())),
            root if LAYERS.iter().any(|rules| rules.name == root) => {
                Some(Self::Layer(root.to_owned()))
            }
            "std" if rest.first().is_some_and(|second| second == "fs") => Some(Self::StdFs),
            root => Some(Self::Crate(root.to_owned())),
        }
    }
}

#[derive(Default)]
struct ReferenceCollector {
    found: BTreeSet<Reference>,
}

impl ReferenceCollector {
    fn record(&mut self, segments: &[String]) {
        if let Some(reference) = Reference::classify(segments) {
            self.found.insert(reference);
        }
    }

    fn record_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(syn::UseName { ident })
            | syn::UseTree::Rename(syn::UseRename { ident, .. }) => {
                prefix.push(ident.to_string());
                self.record(prefix);
                prefix.pop();
            }
            syn::UseTree::Glob(_) => self.record(prefix),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use(item, prefix);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for ReferenceCollector {
    fn visit_path(&mut self, node: &'ast syn::Path) {
        let segments: Vec<String> = node
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        self.record(&segments);
        syn::visit::visit_path(self, node);
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.record_use(&node.tree, &mut Vec::new());
    }
}

fn collect_sources(
    dir: &Dir,
    relative: &Path,
    sources: &mut Vec<LintSource>,
) -> Result<(), ArchitectureLintError> {
    for entry in dir.entries()? {
        let entry = entry?;
        let name = entry.file_name();
        let path = relative.join(&name);
        if entry.file_type()?.is_dir() {
            collect_sources(&entry.open_dir()?, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let contents = dir.read_to_string(&name)?;
            sources.push(LintSource {
                file: path,
                contents,
            });
        }
    }
    Ok(())
}
