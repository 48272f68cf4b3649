//! collection of hcl documents ([Body] and path to source file)
//!
//! [HclDocuments] holds all files of a single module directory and tracks
//! - the source path
//! - the root blocks
//! - the root attributes
//! and defines a numeric index for each. Once added those indices are stable (removal is not possible)
use hcl_edit::structure::{Attribute, Block, Body, Structure};
use std::path::Path;

/// File extension of configuration files
pub const CONFIG_FILE_EXTENSION: &str = ".tf";

#[derive(Default, Debug)]
pub struct HclDocuments {
    sources: Vec<Source>,
    root_attributes: Vec<(usize, Attribute)>,
    root_blocks: Vec<(usize, Block)>,
}

impl HclDocuments {
    /// Inserts and indexes an hcl document
    pub fn insert(&mut self, document: Body, path: impl Into<Option<std::path::PathBuf>>) {
        let source_index = self.sources.len();
        self.sources.push(path.into());

        for structure in document.into_iter() {
            match structure {
                Structure::Block(block) => self.root_blocks.push((source_index, block)),
                Structure::Attribute(attribute) => {
                    self.root_attributes.push((source_index, attribute))
                }
            }
        }
    }

    pub fn get_attribute(&self, index: usize) -> SourceAttribute {
        let (source_index, attribute) = &self.root_attributes[index];
        (index, &self.sources[*source_index], attribute)
    }

    pub fn attributes(&self) -> impl Iterator<Item = SourceAttribute> {
        self.root_attributes
            .iter()
            .enumerate()
            .map(|(index, (source_index, attribute))| {
                (index, &self.sources[*source_index], attribute)
            })
    }

    pub fn get_block(&self, index: usize) -> SourceBlock {
        let (source_index, block) = &self.root_blocks[index];
        (index, &self.sources[*source_index], block)
    }

    pub fn blocks(&self) -> impl Iterator<Item = SourceBlock> {
        self.root_blocks
            .iter()
            .enumerate()
            .map(|(index, (source_index, block))| (index, &self.sources[*source_index], block))
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl HclDocuments {
    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path)?;
        let body = hcl_edit::parser::parse_body(&file_contents)?;

        self.insert(body, Some(file_path));
        Ok(())
    }

    /// Loads every configuration file of a module directory
    ///
    /// Files are loaded in name order so block indices don't depend on the file system.
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let mut file_paths = vec![];

        let read_dir = std::fs::read_dir(dir_path)?;
        for dir_entry in read_dir {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }

            let is_config_file = dir_entry
                .file_name()
                .to_string_lossy()
                .ends_with(CONFIG_FILE_EXTENSION);
            if !is_config_file {
                continue;
            }

            file_paths.push(dir_entry.path());
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_path_buf()));
        }

        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No configuration files found in directory {}", .0.display())]
    NoFilesFound(std::path::PathBuf),
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to parse hcl file")]
    HclParseFailed(#[from] hcl_edit::parser::Error),
}

impl From<Body> for HclDocuments {
    fn from(value: Body) -> Self {
        let mut tree = HclDocuments::default();
        tree.insert(value, None);
        tree
    }
}

/// Utility macro to create [HclDocuments]
///
/// Create from a single document
/// ```
/// # use hclref::hcl_documents;
/// hcl_documents!(r#"variable "x" {}"#);
/// ```
///
/// Create from multiple documents (path required)
/// ```
/// # use hclref::hcl_documents;
/// hcl_documents! {
///   "variables.tf" => r#"variable "x" {}"#,
///   "main.tf" => r#"resource "test" "a" { value = var.x }"#
/// };
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use hclref::hcl_documents;
/// hcl_documents!("not = valid = hcl");
/// ```
#[macro_export]
macro_rules! hcl_documents {
    // single document without source
    { $expr:expr } => {
        $crate::hcl_documents::HclDocuments::from(hcl_edit::parser::parse_body($expr).expect("body must parse"))
    };
    // multi document with sources
    { $($source:expr => $expr:expr),+ } => {{
        let mut docs = $crate::hcl_documents::HclDocuments::default();
        $(
            docs.insert(hcl_edit::parser::parse_body($expr).expect("body must parse"), Some(std::path::PathBuf::from($source)));
        )+

        docs
    }};
}

pub type Source = Option<std::path::PathBuf>;
pub type SourceAttribute<'a> = (usize, &'a Source, &'a Attribute);
pub type SourceBlock<'a> = (usize, &'a Source, &'a Block);

#[cfg(test)]
pub(crate) mod test {
    #[test]
    fn iterators() {
        let hcl_documents = hcl_documents! {r#"
        attr_1 = 1
        resource "a" "b" {}
        module "c" { source = "./c" }
        attr_2 = 2
        attr_3 = 3
        "#};

        assert_eq!(hcl_documents.attributes().count(), 3);
        assert_eq!(hcl_documents.blocks().count(), 2);

        let (index, source, attribute) = hcl_documents.get_attribute(1);
        assert_eq!(index, 1);
        assert!(source.is_none());
        assert_eq!(attribute.key.as_str(), "attr_2");
    }

    #[test]
    fn sources_are_tracked() {
        let hcl_documents = hcl_documents! {
            "variables.tf" => r#"variable "x" {}"#,
            "main.tf" => r#"resource "a" "b" {}"#
        };

        assert_eq!(hcl_documents.source_count(), 2);
        let (_, source, _) = hcl_documents.get_block(1);
        assert_eq!(
            source.as_deref(),
            Some(std::path::Path::new("main.tf"))
        );
    }
}
