//! Resource identity and configuration tables
//!
//! Two parallel fixed-size tables indexed by [`ResourceId`]: the physical
//! pin each resource is wired to, and the electrical configuration it is
//! brought up with. Both are filled once from a board's static
//! declarations and never change afterwards.

use core::fmt;
use core::marker::PhantomData;

use pinboard_hal::gpio::{PinConfig, PinId, Port};

use crate::resource::ResourceId;

/// Static declaration of one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Declaration<R> {
    /// Logical role
    pub resource: R,
    /// Physical pin it is wired to
    pub pin: PinId,
    /// Electrical configuration applied at bring-up
    pub config: PinConfig,
}

impl<R> Declaration<R> {
    pub const fn new(resource: R, pin: PinId, config: PinConfig) -> Self {
        Self {
            resource,
            pin,
            config,
        }
    }
}

/// Errors while populating the tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeclareError<R> {
    /// The resource was declared more than once
    Duplicate(R),
    /// The resource has no declaration
    Missing(R),
    /// Table capacity does not match the number of resource ids
    CapacityMismatch { capacity: usize, count: usize },
}

impl<R: ResourceId> fmt::Display for DeclareError<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclareError::Duplicate(id) => write!(f, "{} declared twice", id.name()),
            DeclareError::Missing(id) => write!(f, "{} has no declaration", id.name()),
            DeclareError::CapacityMismatch { capacity, count } => {
                write!(f, "table capacity {} != {} resources", capacity, count)
            }
        }
    }
}

/// Collects declarations one slot at a time
pub struct TableBuilder<R, const N: usize> {
    slots: [Option<(PinId, PinConfig)>; N],
    _ids: PhantomData<R>,
}

impl<R: ResourceId, const N: usize> TableBuilder<R, N> {
    /// Create an empty builder
    ///
    /// Fails if `N` is not the number of resource ids.
    pub fn new() -> Result<Self, DeclareError<R>> {
        if N != R::COUNT {
            return Err(DeclareError::CapacityMismatch {
                capacity: N,
                count: R::COUNT,
            });
        }
        Ok(Self {
            slots: [None; N],
            _ids: PhantomData,
        })
    }

    /// Fill slot `id` with its identity and configuration
    ///
    /// No electrical validation is done here; that is the driver's job.
    pub fn declare(
        &mut self,
        id: R,
        identity: PinId,
        configuration: PinConfig,
    ) -> Result<(), DeclareError<R>> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(DeclareError::CapacityMismatch {
                capacity: N,
                count: R::COUNT,
            })?;
        if slot.is_some() {
            return Err(DeclareError::Duplicate(id));
        }
        *slot = Some((identity, configuration));
        Ok(())
    }

    /// Check every id has been declared and produce the tables
    ///
    /// Reports the lowest undeclared id.
    pub fn build(self) -> Result<ResourceTables<R, N>, DeclareError<R>> {
        let mut identities = [PinId::new(Port::A, 0); N];
        let mut configs = [PinConfig::default(); N];

        for (index, slot) in self.slots.iter().enumerate() {
            let Some((pin, config)) = *slot else {
                return Err(match R::from_index(index) {
                    Some(id) => DeclareError::Missing(id),
                    None => DeclareError::CapacityMismatch {
                        capacity: N,
                        count: R::COUNT,
                    },
                });
            };
            identities[index] = pin;
            configs[index] = config;
        }

        Ok(ResourceTables {
            identities,
            configs,
            _ids: PhantomData,
        })
    }
}

/// Identity and configuration tables, one entry per resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTables<R, const N: usize> {
    identities: [PinId; N],
    configs: [PinConfig; N],
    _ids: PhantomData<R>,
}

impl<R: ResourceId, const N: usize> ResourceTables<R, N> {
    /// Populate both tables from static declarations
    ///
    /// Declarations may appear in any order; every id must appear exactly
    /// once. Pure: the same declarations always give equal tables.
    pub fn from_declarations(declarations: &[Declaration<R>]) -> Result<Self, DeclareError<R>> {
        let mut builder = TableBuilder::new()?;
        for decl in declarations {
            builder.declare(decl.resource, decl.pin, decl.config)?;
        }
        builder.build()
    }

    /// Physical pin of a resource
    pub fn identity(&self, id: R) -> PinId {
        self.identities[id.index()]
    }

    /// Electrical configuration of a resource
    pub fn config(&self, id: R) -> &PinConfig {
        &self.configs[id.index()]
    }

    /// Whole identity table, in id order
    pub fn identities(&self) -> &[PinId; N] {
        &self.identities
    }

    /// Whole configuration table, in id order
    pub fn configs(&self) -> &[PinConfig; N] {
        &self.configs
    }
}
