//! Entity identifier newtypes.
//!
//! Every aggregate is addressed by a UUID wrapped in its own newtype so ids
//! for different entities cannot be mixed up at compile time. The serde
//! bridge goes through the string form used at the HTTP boundary.

/// Error returned when an identifier fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} id must be a valid UUID")]
pub struct IdParseError {
    entity: &'static str,
}

impl IdParseError {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self { entity }
    }
}

macro_rules! define_entity_id {
    (
        $(#[$outer:meta])*
        $name:ident => $entity:literal
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize, ::utoipa::ToSchema,
        )]
        #[serde(try_from = "String", into = "String")]
        #[schema(value_type = String, format = Uuid)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Validate and construct an identifier from its string form.
            pub fn new(id: &str) -> Result<Self, $crate::domain::ids::IdParseError> {
                ::uuid::Uuid::parse_str(id)
                    .map(Self)
                    .map_err(|_| $crate::domain::ids::IdParseError::new($entity))
            }

            /// Generate a new random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Construct an identifier from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::ids::IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(&value)
            }
        }
    };
}

define_entity_id! {
    /// Stable user identifier.
    UserId => "user"
}

define_entity_id! {
    /// Stable project identifier.
    ProjectId => "project"
}

define_entity_id! {
    /// Stable invite identifier.
    InviteId => "invite"
}

define_entity_id! {
    /// Stable task identifier.
    TaskId => "task"
}
