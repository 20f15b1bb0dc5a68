//! Resolution of package locators into descriptor and resource locations
//!
//! A locator is a filesystem path or a `file://` URL. Paths ending in
//! `.json` name the descriptor itself; any other path is the package
//! directory holding `datapackage.json`. URL locators follow RFC 3986
//! reference resolution, so a directory URL needs a trailing slash.

use serde_json::Value;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::validation::PackageError;

/// File name of the descriptor inside a package directory
pub const DESCRIPTOR_NAME: &str = "datapackage.json";

/// Where a descriptor or resource lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Path(PathBuf),
    Url(Url),
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        match parse_absolute_url(raw) {
            Some(url) => Location::Url(url),
            None => Location::Path(PathBuf::from(raw)),
        }
    }

    /// The local file this location refers to
    pub fn to_path(&self) -> Result<PathBuf, PackageError> {
        match self {
            Location::Path(path) => Ok(path.clone()),
            Location::Url(url) if url.scheme() == "file" => {
                url.to_file_path()
                    .map_err(|()| PackageError::InvalidLocator {
                        locator: url.to_string(),
                        reason: "not a local file URL".to_string(),
                    })
            }
            Location::Url(url) => Err(PackageError::UnsupportedScheme {
                location: url.to_string(),
                scheme: url.scheme().to_string(),
            }),
        }
    }

    /// Open the location for reading
    pub fn open(&self) -> Result<std::io::Result<File>, PackageError> {
        let path = self.to_path()?;
        Ok(File::open(path))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Url(url) => f.write_str(url.as_str()),
        }
    }
}

// Single-letter schemes are Windows drive letters, not URLs
fn parse_absolute_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    (url.scheme().len() > 1).then_some(url)
}

/// A package's descriptor location and the base its resources resolve against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    descriptor: Location,
    base: Location,
}

impl PackageLocation {
    pub fn resolve(locator: &str) -> Result<Self, PackageError> {
        if locator.trim().is_empty() {
            return Err(PackageError::InvalidLocator {
                locator: locator.to_string(),
                reason: "locator is empty".to_string(),
            });
        }

        let resolved = match Location::parse(locator) {
            Location::Url(url) => {
                if url.scheme() != "file" {
                    return Err(PackageError::UnsupportedScheme {
                        location: url.to_string(),
                        scheme: url.scheme().to_string(),
                    });
                }
                let descriptor = if url.path().ends_with(".json") {
                    url.clone()
                } else {
                    join_url(&url, DESCRIPTOR_NAME)?
                };
                Self {
                    descriptor: Location::Url(descriptor),
                    base: Location::Url(url),
                }
            }
            Location::Path(path) => {
                if is_json_file(&path) {
                    let base = match path.parent() {
                        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                        _ => PathBuf::from("."),
                    };
                    Self {
                        descriptor: Location::Path(path),
                        base: Location::Path(base),
                    }
                } else {
                    Self {
                        descriptor: Location::Path(path.join(DESCRIPTOR_NAME)),
                        base: Location::Path(path),
                    }
                }
            }
        };

        debug!("Descriptor location: {}", resolved.descriptor);
        Ok(resolved)
    }

    pub fn descriptor(&self) -> &Location {
        &self.descriptor
    }

    pub fn base(&self) -> &Location {
        &self.base
    }

    /// Join a resource path onto the package base. Absolute URLs are kept as-is.
    pub fn resource(&self, path: &str) -> Result<Location, PackageError> {
        if let Some(url) = parse_absolute_url(path) {
            return Ok(Location::Url(url));
        }
        match &self.base {
            Location::Path(dir) => Ok(Location::Path(dir.join(path))),
            Location::Url(base) => join_url(base, path).map(Location::Url),
        }
    }

    /// Read and parse the descriptor JSON
    pub fn read_descriptor(&self) -> Result<Value, PackageError> {
        let path = self.descriptor.to_path()?;
        let content =
            fs::read_to_string(&path).map_err(|source| PackageError::DescriptorUnreadable {
                location: self.descriptor.to_string(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| PackageError::MalformedDescriptor {
            location: self.descriptor.to_string(),
            source,
        })
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        && !path.is_dir()
}

fn join_url(base: &Url, path: &str) -> Result<Url, PackageError> {
    base.join(path).map_err(|e| PackageError::InvalidLocator {
        locator: format!("{base} + {path}"),
        reason: e.to_string(),
    })
}
