//! Resolved schema metadata shared by the extraction analyzers and checks.

use resource_lint_go::{FileKey, NodeRef, Position};

/// Terraform attribute type, from `Type: pluginsdk.TypeString` and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaType {
    /// `TypeString`
    String,
    /// `TypeInt`
    Int,
    /// `TypeFloat`
    Float,
    /// `TypeBool`
    Bool,
    /// `TypeList`
    List,
    /// `TypeSet`
    Set,
    /// `TypeMap`
    Map,
    /// Missing or not recognised.
    #[default]
    Unknown,
}

impl SchemaType {
    /// Maps the selector name (`TypeString`) to a type.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "TypeString" => Self::String,
            "TypeInt" => Self::Int,
            "TypeFloat" => Self::Float,
            "TypeBool" => Self::Bool,
            "TypeList" => Self::List,
            "TypeSet" => Self::Set,
            "TypeMap" => Self::Map,
            _ => Self::Unknown,
        }
    }
}

/// Where a flag such as `Optional: true` was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSite {
    /// Byte offset of the keyed element.
    pub offset: usize,
    /// Position of the keyed element.
    pub position: Position,
}

/// Element type of a collection attribute.
#[derive(Debug, Clone)]
pub enum SchemaElem {
    /// `Elem: &Resource{Schema: ...}`, a nested block.
    Block(SchemaMap),
    /// `Elem: &Schema{...}`, a primitive element.
    Schema(Box<SchemaInfo>),
    /// An expression that could not be followed.
    Unresolved,
}

/// Attribute metadata read from one `Schema` literal.
#[derive(Debug, Clone, Default)]
pub struct SchemaInfo {
    /// Declared attribute type.
    pub schema_type: SchemaType,
    /// `Required: true`
    pub required: bool,
    /// `Optional: true`
    pub optional: bool,
    /// `Computed: true`
    pub computed: bool,
    /// `ForceNew: true`
    pub force_new: bool,
    /// `ValidateFunc` or `ValidateDiagFunc` set to something other than `nil`.
    pub has_validation: bool,
    /// `MaxItems`, when it is an integer literal.
    pub max_items: Option<u64>,
    /// `AtLeastOneOf` is set.
    pub at_least_one_of: bool,
    /// `Elem`, when present.
    pub elem: Option<SchemaElem>,
    /// Site of `Optional: true`.
    pub optional_at: Option<FlagSite>,
    /// Site of `Computed: true`.
    pub computed_at: Option<FlagSite>,
    /// A `NOTE: O+C` comment sits between `Optional` and `Computed`.
    pub oc_note: bool,
    /// Line of the `Elem` key.
    pub elem_line: Option<usize>,
    /// A comment shares the line of the `Elem` key.
    pub elem_comment: bool,
    /// File declaring the literal.
    pub file: Option<FileKey>,
    /// Start of the literal.
    pub position: Position,
}

impl SchemaInfo {
    /// Computed without being settable by the user.
    #[must_use]
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    /// Nested block schema, if `Elem` is a resource.
    #[must_use]
    pub fn block(&self) -> Option<&SchemaMap> {
        match &self.elem {
            Some(SchemaElem::Block(map)) => Some(map),
            _ => None,
        }
    }
}

/// One named entry of a schema map.
#[derive(Debug, Clone)]
pub struct SchemaField {
    /// Attribute name (the map key).
    pub name: String,
    /// Resolved attribute metadata.
    pub info: SchemaInfo,
    /// Declaration index within the map, starting at 0.
    pub position: usize,
    /// File declaring the key.
    pub file: FileKey,
    /// Position of the key.
    pub key_position: Position,
}

/// A map key whose value could not be followed.
#[derive(Debug, Clone)]
pub struct UnresolvedKey {
    /// Attribute name (the map key).
    pub name: String,
    /// File declaring the key.
    pub file: FileKey,
    /// Position of the key.
    pub key_position: Position,
}

/// A `map[string]*Schema` literal with its entries in source order.
#[derive(Debug, Clone)]
pub struct SchemaMap {
    /// Handle of the map literal.
    pub id: NodeRef,
    /// Start of the map literal.
    pub position: Position,
    /// Declared under an `Elem`.
    pub nested: bool,
    /// Entries that were resolved.
    pub fields: Vec<SchemaField>,
    /// Entries whose name or value could not be resolved.
    pub unresolved: usize,
    /// Names of the unresolved entries that have a string key.
    pub unresolved_keys: Vec<UnresolvedKey>,
}

impl SchemaMap {
    /// Number of entries in the literal, resolved or not.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.fields.len() + self.unresolved
    }

    /// Every entry was resolved.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved == 0
    }

    /// Field named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Every string key with its file and position, resolved or not.
    ///
    /// Resolved fields come first, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, FileKey, Position)> {
        let resolved = self
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.file, f.key_position));
        let unresolved = self
            .unresolved_keys
            .iter()
            .map(|k| (k.name.as_str(), k.file, k.key_position));
        resolved.chain(unresolved)
    }

    /// Overlays `overlay` on `base`.
    ///
    /// Overlay fields replace base fields of the same name in place, base
    /// fields without a counterpart are kept, and overlay-only fields are
    /// appended. The result takes its identity from the overlay.
    #[must_use]
    pub fn merge(base: Self, overlay: Self) -> Self {
        let mut remaining: Vec<Option<SchemaField>> = overlay.fields.into_iter().map(Some).collect();
        let mut fields = Vec::with_capacity(base.fields.len() + remaining.len());

        for field in base.fields {
            let replacement = remaining
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|o| o.name == field.name))
                .and_then(Option::take);
            fields.push(replacement.unwrap_or(field));
        }
        fields.extend(remaining.into_iter().flatten());
        for (i, field) in fields.iter_mut().enumerate() {
            field.position = i;
        }

        let mut unresolved_keys = base.unresolved_keys;
        unresolved_keys.extend(overlay.unresolved_keys);

        Self {
            id: overlay.id,
            position: overlay.position,
            nested: overlay.nested,
            fields,
            unresolved: base.unresolved + overlay.unresolved,
            unresolved_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_lint_go::GoFile;

    fn field(file: FileKey, name: &str, position: usize, required: bool) -> SchemaField {
        SchemaField {
            name: name.to_owned(),
            info: SchemaInfo {
                required,
                optional: !required,
                ..SchemaInfo::default()
            },
            position,
            file,
            key_position: Position { line: 1, column: 1 },
        }
    }

    fn map(file: &GoFile, names: &[(&str, bool)]) -> SchemaMap {
        SchemaMap {
            id: file.node_ref(file.root()),
            position: Position { line: 1, column: 1 },
            nested: false,
            fields: names
                .iter()
                .enumerate()
                .map(|(i, (n, r))| field(file.key(), n, i, *r))
                .collect(),
            unresolved: 0,
            unresolved_keys: Vec::new(),
        }
    }

    #[test]
    fn type_names_map_to_types() {
        assert_eq!(SchemaType::from_name("TypeString"), SchemaType::String);
        assert_eq!(SchemaType::from_name("TypeList"), SchemaType::List);
        assert_eq!(SchemaType::from_name("TypeInvalid"), SchemaType::Unknown);
    }

    #[test]
    fn merge_replaces_in_place_and_appends() {
        let base_file = GoFile::parse("/w/a.go", "a.go", "package a\n".to_owned()).expect("parse");
        let overlay_file = GoFile::parse("/w/b.go", "b.go", "package a\n\n".to_owned()).expect("parse");
        let base = map(&base_file, &[("name", true), ("sku", false), ("tags", false)]);
        let overlay = map(&overlay_file, &[("sku", true), ("extra", false)]);
        let overlay_id = overlay.id;

        let merged = SchemaMap::merge(base, overlay);
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["name", "sku", "tags", "extra"]);
        assert!(merged.field("sku").is_some_and(|f| f.info.required));
        assert_eq!(
            merged.fields.iter().map(|f| f.position).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(merged.id, overlay_id);
    }

    #[test]
    fn computed_only_excludes_optional_computed() {
        let info = SchemaInfo {
            optional: true,
            computed: true,
            ..SchemaInfo::default()
        };
        assert!(!info.is_computed_only());
        let info = SchemaInfo {
            computed: true,
            ..SchemaInfo::default()
        };
        assert!(info.is_computed_only());
    }
}
