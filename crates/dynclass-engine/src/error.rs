//! Error types for the dynclass engine

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error types
///
/// Every failure is surfaced synchronously to the caller; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Compilation or population attempted with no property descriptors
    #[error("Schema is empty: at least one property is required")]
    SchemaEmpty,

    /// A property with this name already exists
    #[error("Property '{0}' already exists")]
    DuplicateProperty(String),

    /// Carrier type is not a metadata carrier
    #[error("Type '{0}' is not an attribute carrier type")]
    InvalidAttributeType(String),

    /// No constructor on the carrier matches the attribute values
    #[error("Cannot construct attribute '{carrier}' from ({signature})")]
    AttributeConstruction {
        /// Carrier type name (or attribute label)
        carrier: String,
        /// Runtime types of the supplied values
        signature: String,
    },

    /// Ad hoc metadata uses a key reserved for carrier internals
    #[error("Attribute '{carrier}' cannot use reserved key '{key}'")]
    ReservedAttributeKey {
        /// Attribute label
        carrier: String,
        /// Offending key
        key: String,
    },

    /// The type has already been compiled
    #[error("Type '{0}' is already compiled and its schema is frozen")]
    SchemaFrozen(String),

    /// Value is not assignable to the target type
    #[error("Type mismatch for {target}: expected {expected}, got {got}")]
    TypeMismatch {
        /// Property, parameter or container receiving the value
        target: String,
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Named access to a property the type does not define
    #[error("Property '{property}' not found in type '{type_name}'")]
    UnknownProperty {
        /// Type name
        type_name: String,
        /// Requested property
        property: String,
    },

    /// Write to a property without a setter
    #[error("Property '{property}' of type '{type_name}' is read-only")]
    ReadOnlyProperty {
        /// Type name
        type_name: String,
        /// Property name
        property: String,
    },

    /// No constructor accepts the supplied argument types
    #[error("No constructor of '{type_name}' accepts ({signature})")]
    NoMatchingConstructor {
        /// Type name
        type_name: String,
        /// Runtime types of the supplied arguments
        signature: String,
    },

    /// Constructor called with the wrong number of arguments
    #[error("Constructor of '{type_name}' expects {expected} arguments, got {got}")]
    ArgumentCount {
        /// Type name
        type_name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// A type with this name is already defined in the working module
    #[error("Type '{0}' already exists in the working module")]
    DuplicateType(String),

    /// JSON extraction failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Build a type mismatch error
    pub(crate) fn mismatch(
        target: impl Into<String>,
        expected: impl std::fmt::Display,
        got: impl std::fmt::Display,
    ) -> Self {
        EngineError::TypeMismatch {
            target: target.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }
}
