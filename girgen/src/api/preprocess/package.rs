//! Remove pkg-config packages and C includes from a repository.

use regex::Regex;
use roxygen::roxygen;
use tracing::warn;

use crate::api::preprocess::Preprocessor;
use crate::error::{GirError, Result};
use crate::gir::Repositories;

/// Matches names either literally or, for inputs written as `/regex/`, by an
/// unanchored regular expression.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    matchers: Vec<Matcher>,
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl PathMatcher {
    pub fn new<I, S>(inputs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matchers = inputs
            .into_iter()
            .map(|input| {
                let input = input.as_ref();
                match input.strip_prefix('/').and_then(|s| s.strip_suffix('/')) {
                    Some(pattern) => Regex::new(pattern)
                        .map(Matcher::Regex)
                        .map_err(|source| GirError::InvalidRegex {
                            pattern: pattern.to_string(),
                            source,
                        }),
                    None => Ok(Matcher::Literal(input.to_string())),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { matchers })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.matchers.iter().any(|matcher| match matcher {
            Matcher::Literal(literal) => literal == name,
            Matcher::Regex(regex) => regex.is_match(name),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Packages,
    CIncludes,
}

/// Builder for [`RemovePackages`] and [`RemoveCIncludes`]
pub struct Builder {
    gir_file: String,
    names: Vec<String>,
}

impl Builder {
    #[roxygen]
    pub fn new<S: Into<String>>(
        /// File name (or full path) the repository was loaded from
        gir_file: S,
    ) -> Self {
        Self {
            gir_file: gir_file.into(),
            names: Vec::new(),
        }
    }

    /// Add a name to remove. `/.../` makes it a regular expression.
    ///
    /// # Example
    ///
    /// ```
    /// let remove = girgen::preprocess::RemovePackages::builder("Gtk-4.0.gir")
    ///     .name("gtk4-wayland")
    ///     .name("/gtk4-x11.*/")
    ///     .build_packages()
    ///     .unwrap();
    /// ```
    #[roxygen]
    pub fn name<S: Into<String>>(
        mut self,
        /// Literal name or `/regex/`
        name: S,
    ) -> Self {
        self.names.push(name.into());
        self
    }

    /// Build a preprocessor removing matching pkg-config packages
    pub fn build_packages(self) -> Result<RemovePackages> {
        Ok(RemovePackages(self.build(Target::Packages)?))
    }

    /// Build a preprocessor removing matching C includes
    pub fn build_c_includes(self) -> Result<RemoveCIncludes> {
        Ok(RemoveCIncludes(self.build(Target::CIncludes)?))
    }

    fn build(self, target: Target) -> Result<RemoveNames> {
        Ok(RemoveNames {
            matcher: PathMatcher::new(&self.names)?,
            gir_file: self.gir_file,
            target,
        })
    }
}

struct RemoveNames {
    gir_file: String,
    matcher: PathMatcher,
    target: Target,
}

impl RemoveNames {
    fn remove(&self, repos: &mut Repositories) {
        let Some(repo) = repos.from_gir_file(&self.gir_file) else {
            warn!(gir_file = %self.gir_file, target = ?self.target, "gir file not found");
            return;
        };
        match self.target {
            Target::Packages => repo.packages.retain(|pkg| !self.matcher.is_match(&pkg.name)),
            Target::CIncludes => repo.c_includes.retain(|incl| !self.matcher.is_match(&incl.name)),
        }
    }
}

/// Drop pkg-config packages from one repository.
pub struct RemovePackages(RemoveNames);

impl RemovePackages {
    pub fn builder<S: Into<String>>(gir_file: S) -> Builder {
        Builder::new(gir_file)
    }
}

impl Preprocessor for RemovePackages {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        self.0.remove(repos);
        Ok(())
    }
}

/// Drop C includes from one repository.
pub struct RemoveCIncludes(RemoveNames);

impl RemoveCIncludes {
    pub fn builder<S: Into<String>>(gir_file: S) -> Builder {
        Builder::new(gir_file)
    }
}

impl Preprocessor for RemoveCIncludes {
    fn preprocess(&self, repos: &mut Repositories) -> Result<()> {
        self.0.remove(repos);
        Ok(())
    }
}
