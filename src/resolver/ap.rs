use std::collections::HashMap;

use log::{debug, info};

use super::{lookup_type, AddressResolver, Resolved};
use crate::errors::{BuildError, ResolveError};
use crate::matrix::raw::{RawAdaptive, RawInterfaceMember, RawServiceInterface};
use crate::matrix::reference::{canonical_key, canonical_name, is_under};
use crate::matrix::Module;
use crate::types::{SomeipMethodId, SomeipServiceId};

#[derive(Debug, Clone, PartialEq)]
struct Member {
    /// deployment short name, returned as the label
    label: String,
    type_ref: String,
}

#[derive(Debug, Clone)]
struct ServiceEntry {
    interface: String,
    events: HashMap<SomeipMethodId, Member>,
    field_notifiers: HashMap<SomeipMethodId, Member>,
}

/// Adaptive Platform addressing: service id -> deployment -> interface
/// member -> type.
#[derive(Debug, Clone)]
pub struct ApResolver {
    services: HashMap<SomeipServiceId, ServiceEntry>,
}

fn find_member<'a>(
    members: &'a [RawInterfaceMember],
    reference: &str,
) -> Option<&'a RawInterfaceMember> {
    let key = canonical_key(reference);
    members.iter().find(|m| canonical_name(&m.short_name) == key)
}

impl ApResolver {
    pub fn build(raw: &RawAdaptive) -> Result<ApResolver, BuildError> {
        let mut interfaces: HashMap<String, &RawServiceInterface> = HashMap::new();
        for interface in &raw.interfaces {
            if interface.events.is_empty() && interface.fields.is_empty() {
                return Err(BuildError::EmptyInterface(interface.short_name.clone()));
            }
            if interfaces
                .insert(canonical_name(&interface.short_name), interface)
                .is_some()
            {
                return Err(BuildError::DuplicateInterface(interface.short_name.clone()));
            }
        }

        let mut services = HashMap::new();
        for svc in &raw.services {
            if svc.events.is_empty() && svc.field_notifiers.is_empty() {
                return Err(BuildError::EmptyService(svc.short_name.clone()));
            }
            let interface = interfaces
                .get(&canonical_key(&svc.interface_ref))
                .ok_or_else(|| BuildError::InterfaceNotFound {
                    service: svc.short_name.clone(),
                    interface: svc.interface_ref.clone(),
                })?;

            let check = |reference: &str,
                         members: &[RawInterfaceMember]|
             -> Result<String, BuildError> {
                if !is_under(reference, &svc.interface_ref) {
                    return Err(BuildError::ForeignReference {
                        service: svc.short_name.clone(),
                        interface: svc.interface_ref.clone(),
                        reference: reference.to_owned(),
                    });
                }
                find_member(members, reference)
                    .map(|m| m.type_ref.clone())
                    .ok_or_else(|| BuildError::DanglingReference {
                        service: svc.short_name.clone(),
                        interface: svc.interface_ref.clone(),
                        reference: reference.to_owned(),
                    })
            };

            let mut entry = ServiceEntry {
                interface: interface.short_name.clone(),
                events: HashMap::new(),
                field_notifiers: HashMap::new(),
            };
            for event in &svc.events {
                let type_ref = check(&event.event_ref, &interface.events)?;
                let member = Member {
                    label: event.short_name.clone(),
                    type_ref,
                };
                if entry.events.insert(event.event_id, member).is_some() {
                    return Err(BuildError::DuplicateIdentifier {
                        service: svc.short_name.clone(),
                        id: event.event_id as u32,
                    });
                }
            }
            for field in &svc.field_notifiers {
                let type_ref = check(&field.field_ref, &interface.fields)?;
                let member = Member {
                    label: field.short_name.clone(),
                    type_ref,
                };
                if entry.events.contains_key(&field.event_id)
                    || entry.field_notifiers.insert(field.event_id, member).is_some()
                {
                    return Err(BuildError::DuplicateIdentifier {
                        service: svc.short_name.clone(),
                        id: field.event_id as u32,
                    });
                }
            }
            debug!(
                "service {} ({}) -> {}: {} events, {} field notifiers",
                svc.short_name,
                svc.service_id,
                entry.interface,
                entry.events.len(),
                entry.field_notifiers.len()
            );
            if services.insert(svc.service_id, entry).is_some() {
                return Err(BuildError::DuplicateService(svc.service_id));
            }
        }
        info!(
            "adaptive: {} services, {} interfaces",
            services.len(),
            interfaces.len()
        );
        Ok(ApResolver { services })
    }
}

impl AddressResolver for ApResolver {
    fn resolve(
        &self,
        module: &Module,
        service_id: SomeipServiceId,
        id: u32,
    ) -> Result<Resolved, ResolveError> {
        let svc = self
            .services
            .get(&service_id)
            .ok_or(ResolveError::ServiceNotFound(service_id))?;
        let unknown = ResolveError::UnknownEventOrField {
            service: service_id,
            id,
        };
        let event_id = SomeipMethodId::try_from(id).map_err(|_| unknown.clone())?;
        let member = svc
            .events
            .get(&event_id)
            .or_else(|| svc.field_notifiers.get(&event_id))
            .ok_or(unknown)?;
        let type_id = lookup_type(module, &member.type_ref)?;
        debug!(
            "{}.{} -> {} ({})",
            service_id, id, member.label, member.type_ref
        );
        Ok(Resolved {
            label: member.label.clone(),
            type_id,
        })
    }
}
