// -- imports
use std::str::FromStr;
use strum::{Display, EnumString, VariantNames};

use crate::error::{AppError, Result};

/// The 20 object categories of the PASCAL VOC benchmark, in index order.
pub const VOC_LABELS: [&str; 20] = [
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

// -- enums

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display, VariantNames)]
/// Label format the checkpoint was trained against
pub enum LabelFormat {
    /// Fixed 20-class benchmark taxonomy
    #[strum(serialize = "VOC")]
    Voc,

    /// Class names supplied by the user
    #[strum(serialize = "labelme")]
    Labelme,
}

/// Value parser with a helpful error message listing the supported formats
pub fn parse_label_format(value: &str) -> std::result::Result<LabelFormat, String> {
    LabelFormat::from_str(value).map_err(|_| {
        format!(
            "unsupported label format {:?}, expected one of {}",
            value,
            LabelFormat::VARIANTS.join(", ")
        )
    })
}

// -- structs

/// Canonical class-name mapping. Indices are dense, zero based and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    names: Vec<String>,
}

impl Taxonomy {
    /// The fixed 20-class benchmark mapping.
    pub fn voc() -> Self {
        Self {
            names: VOC_LABELS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Build from a comma separated list, assigning indices in input order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the list is empty, contains an empty
    /// entry, or contains the same name twice.
    pub fn from_comma_list(list: &str) -> Result<Self> {
        if list.trim().is_empty() {
            return Err(AppError::Config(
                "Class names are required for the labelme format, e.g. --classes-names cat,dog"
                    .to_string(),
            ));
        }

        let names: Vec<String> = list.split(',').map(|name| name.trim().to_string()).collect();

        for (idx, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(AppError::Config(format!(
                    "Empty class name at position {idx} in {list:?}"
                )));
            }
            if names[..idx].contains(name) {
                return Err(AppError::Config(format!("Duplicate class name {name:?}")));
            }
        }

        Ok(Self { names })
    }

    /// Resolve the taxonomy for a label format.
    ///
    /// `classes_names` is only consulted for [`LabelFormat::Labelme`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the labelme class list is invalid.
    pub fn resolve(format: LabelFormat, classes_names: &str) -> Result<Self> {
        match format {
            LabelFormat::Voc => Ok(Self::voc()),
            LabelFormat::Labelme => Self::from_comma_list(classes_names),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Class name for a label index, `None` when the index is out of range.
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Label index for a class name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

// -- tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voc_has_20_dense_unique_entries() {
        let taxonomy = Taxonomy::voc();
        assert_eq!(taxonomy.len(), 20);

        for (idx, name) in taxonomy.names().enumerate() {
            assert_eq!(taxonomy.index_of(name), Some(idx));
            assert_eq!(taxonomy.name_of(idx), Some(name));
        }
        assert!(taxonomy.name_of(20).is_none());
    }

    #[test]
    fn test_comma_list_assigns_indices_in_order() {
        let taxonomy = Taxonomy::from_comma_list("cat,dog,bird").unwrap();
        assert_eq!(taxonomy.len(), 3);
        assert_eq!(taxonomy.index_of("cat"), Some(0));
        assert_eq!(taxonomy.index_of("dog"), Some(1));
        assert_eq!(taxonomy.index_of("bird"), Some(2));
        assert_eq!(taxonomy.name_of(1), Some("dog"));
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(Taxonomy::from_comma_list("").is_err());
        assert!(Taxonomy::from_comma_list("   ").is_err());
    }

    #[test]
    fn test_empty_entry_is_rejected() {
        assert!(Taxonomy::from_comma_list("cat,,dog").is_err());
        assert!(Taxonomy::from_comma_list("cat,dog,").is_err());
    }

    #[test]
    fn test_duplicate_entry_is_rejected() {
        assert!(Taxonomy::from_comma_list("cat,dog,cat").is_err());
    }

    #[test]
    fn test_entries_are_trimmed() {
        let taxonomy = Taxonomy::from_comma_list("cat, dog").unwrap();
        assert_eq!(taxonomy.index_of("dog"), Some(1));
    }

    #[test]
    fn test_resolve_voc_ignores_class_names() {
        let taxonomy = Taxonomy::resolve(LabelFormat::Voc, "cat,dog").unwrap();
        assert_eq!(taxonomy.len(), 20);
        assert_eq!(taxonomy.index_of("aeroplane"), Some(0));
        assert_eq!(taxonomy.index_of("tvmonitor"), Some(19));
    }

    #[test]
    fn test_resolve_labelme_requires_class_names() {
        assert!(Taxonomy::resolve(LabelFormat::Labelme, "").is_err());
        let taxonomy = Taxonomy::resolve(LabelFormat::Labelme, "cat,dog").unwrap();
        assert_eq!(taxonomy.len(), 2);
    }

    #[test]
    fn test_label_format_parsing() {
        assert_eq!(parse_label_format("VOC"), Ok(LabelFormat::Voc));
        assert_eq!(parse_label_format("labelme"), Ok(LabelFormat::Labelme));

        let err = parse_label_format("coco").unwrap_err();
        assert!(err.contains("VOC"));
        assert!(err.contains("labelme"));
    }

    #[test]
    fn test_label_format_display() {
        assert_eq!(LabelFormat::Voc.to_string(), "VOC");
        assert_eq!(LabelFormat::Labelme.to_string(), "labelme");
    }
}
