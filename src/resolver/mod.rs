//! 根据 (serviceID, eventID/headerID) 找到对应的数据类型
//!
//! Two addressing dialects exist. Which one applies is decided once per
//! configuration document, see [`Resolver::from_document`].

pub mod ap;
pub mod cp;

use log::info;

use crate::errors::{BuildError, ResolveError};
use crate::matrix::reference::last_segment;
use crate::matrix::{ConfigDocument, Module, TypeId};
use crate::types::SomeipServiceId;

pub use ap::ApResolver;
pub use cp::CpResolver;

/// Result of an address lookup: the display label of the payload and the
/// root type to decode it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub label: String,
    pub type_id: TypeId,
}

pub trait AddressResolver {
    /// `id` is the event or field notifier id for AP, the 32-bit header id
    /// for CP.
    fn resolve(
        &self,
        module: &Module,
        service_id: SomeipServiceId,
        id: u32,
    ) -> Result<Resolved, ResolveError>;
}

#[derive(Debug, Clone)]
pub enum Resolver {
    Adaptive(ApResolver),
    Classic(CpResolver),
}

impl Resolver {
    /// Picks the dialect by the sections the document carries. A classic
    /// section wins when both are present.
    pub fn from_document(doc: &ConfigDocument) -> Result<Resolver, BuildError> {
        let resolver = match (&doc.classic, &doc.adaptive) {
            (Some(classic), _) => Resolver::Classic(CpResolver::build(classic)?),
            (None, Some(adaptive)) => Resolver::Adaptive(ApResolver::build(adaptive)?),
            (None, None) => return Err(BuildError::NoAddressingSections),
        };
        info!("{} addressing selected for {}", resolver.platform(), doc.name);
        Ok(resolver)
    }

    pub fn platform(&self) -> &'static str {
        match self {
            Resolver::Adaptive(_) => "adaptive",
            Resolver::Classic(_) => "classic",
        }
    }
}

impl AddressResolver for Resolver {
    fn resolve(
        &self,
        module: &Module,
        service_id: SomeipServiceId,
        id: u32,
    ) -> Result<Resolved, ResolveError> {
        match self {
            Resolver::Adaptive(r) => r.resolve(module, service_id, id),
            Resolver::Classic(r) => r.resolve(module, service_id, id),
        }
    }
}

/// Final step shared by both dialects.
pub(crate) fn lookup_type(module: &Module, type_ref: &str) -> Result<TypeId, ResolveError> {
    module
        .lookup(type_ref)
        .ok_or_else(|| ResolveError::TypeNotFound(last_segment(type_ref).to_owned()))
}
