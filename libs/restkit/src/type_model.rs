use crate::error::ContractError;
use crate::metadata::{HeaderTag, VersionTag};
use crate::scanner::MetadataScanner;

/// Contract-level metadata with its parent chain.
///
/// Each level keeps only what it declares itself; the accessors fold the
/// chain root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractTypeModel {
    name: String,
    path: Option<String>,
    headers: Vec<HeaderTag>,
    version: Option<VersionTag>,
    parent: Option<Box<ContractTypeModel>>,
}

impl ContractTypeModel {
    /// Build the model of contract `name` and all of its ancestors.
    ///
    /// # Errors
    /// Unknown contracts, invalid parents and inheritance cycles.
    pub fn resolve(scanner: &MetadataScanner<'_>, name: &str) -> Result<Self, ContractError> {
        let lineage = scanner.lineage(name)?;

        let mut model: Option<Self> = None;
        for contract in lineage {
            model = Some(Self {
                name: contract.name.clone(),
                path: MetadataScanner::path(&contract.tags)
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .map(str::to_owned),
                headers: MetadataScanner::headers([contract.tags.as_slice()]),
                version: MetadataScanner::version([contract.tags.as_slice()]).cloned(),
                parent: model.map(Box::new),
            });
        }

        model.ok_or_else(|| ContractError::UnknownContract(name.to_owned()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Path declared by this level only.
    #[must_use]
    pub fn own_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Non-blank contract paths, root first.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths = self.parent.as_ref().map_or_else(Vec::new, |parent| parent.paths());
        paths.extend(self.path.as_deref());
        paths
    }

    /// Headers of every level, root first, duplicates dropped.
    #[must_use]
    pub fn headers(&self) -> Vec<HeaderTag> {
        let mut headers = self
            .parent
            .as_ref()
            .map_or_else(Vec::new, |parent| parent.headers());
        for header in &self.headers {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
        headers
    }

    /// Nearest version declaration in the chain.
    #[must_use]
    pub fn version(&self) -> Option<&VersionTag> {
        self.version
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|parent| parent.version()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::contract::{ContractCatalog, ContractDef};
    use crate::metadata::Tag;

    fn three_levels() -> ContractCatalog {
        ContractCatalog::new()
            .with(
                ContractDef::new("Root")
                    .tag(Tag::Path("/root".to_owned()))
                    .tag(Tag::Header(HeaderTag::new("X-Root", "1")))
                    .tag(Tag::Version(VersionTag::new("v1").in_uri())),
            )
            .and_then(|c| {
                c.with(
                    ContractDef::new("Middle")
                        .extends("Root")
                        .tag(Tag::Path("  ".to_owned()))
                        .tag(Tag::Header(HeaderTag::new("X-Middle", "2"))),
                )
            })
            .and_then(|c| {
                c.with(
                    ContractDef::new("Leaf")
                        .extends("Middle")
                        .tag(Tag::Path("/leaf".to_owned()))
                        .tag(Tag::Header(HeaderTag::new("X-Root", "1")))
                        .tag(Tag::Version(VersionTag::new("v3"))),
                )
            })
            .unwrap()
    }

    #[test]
    fn test_paths_root_first_blank_skipped() {
        let catalog = three_levels();
        let model = ContractTypeModel::resolve(&MetadataScanner::new(&catalog), "Leaf").unwrap();
        assert_eq!(model.paths(), vec!["/root", "/leaf"]);
        assert_eq!(model.parent().map(ContractTypeModel::name), Some("Middle"));
    }

    #[test]
    fn test_headers_union_root_first() {
        let catalog = three_levels();
        let model = ContractTypeModel::resolve(&MetadataScanner::new(&catalog), "Leaf").unwrap();
        assert_eq!(
            model.headers(),
            vec![HeaderTag::new("X-Root", "1"), HeaderTag::new("X-Middle", "2")]
        );
    }

    #[test]
    fn test_nearest_version_wins() {
        let catalog = three_levels();
        let scanner = MetadataScanner::new(&catalog);
        let leaf = ContractTypeModel::resolve(&scanner, "Leaf").unwrap();
        assert_eq!(leaf.version(), Some(&VersionTag::new("v3")));
        let middle = ContractTypeModel::resolve(&scanner, "Middle").unwrap();
        assert_eq!(middle.version(), Some(&VersionTag::new("v1").in_uri()));
    }
}
