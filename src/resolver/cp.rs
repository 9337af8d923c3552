use std::collections::HashMap;

use log::{debug, info, warn};

use super::{lookup_type, AddressResolver, Resolved};
use crate::errors::{BuildError, CpHop, ResolveError};
use crate::matrix::raw::RawClassic;
use crate::matrix::reference::{
    canonical_key, canonical_name, last_segment, matches_suffix, second_to_last_segment,
};
use crate::matrix::Module;
use crate::types::{SomeipHeaderId, SomeipServiceId};

/// Classic Platform addressing. Every table is owned by one configuration
/// fragment and keyed by the canonical name of its entries; values keep the
/// raw references.
#[derive(Debug, Clone, Default)]
pub struct CpResolver {
    service_instances: HashMap<SomeipServiceId, String>,
    /// only call-direction connections are kept
    header_ids: HashMap<SomeipHeaderId, String>,
    pdu_triggerings: HashMap<String, String>,
    signal_pdus: HashMap<String, String>,
    signals: HashMap<String, String>,
    /// (system signal ref, operation ref), document order
    signal_mappings: Vec<(String, String)>,
    interfaces: HashMap<String, HashMap<String, String>>,
}

/// Keys that collapse to the same canonical key would make lookups depend
/// on map iteration order, so they fail the build.
fn canonical_table(
    table: &str,
    raw: &HashMap<String, String>,
) -> Result<HashMap<String, String>, BuildError> {
    let mut out = HashMap::with_capacity(raw.len());
    for (k, v) in raw {
        let key = canonical_key(k);
        if out.insert(key.clone(), v.clone()).is_some() {
            return Err(BuildError::DuplicateKey {
                table: table.to_owned(),
                key,
            });
        }
    }
    Ok(out)
}

fn hop(hop: CpHop, key: &str) -> ResolveError {
    ResolveError::Hop {
        hop,
        key: key.to_owned(),
    }
}

impl CpResolver {
    pub fn build(raw: &RawClassic) -> Result<CpResolver, BuildError> {
        let mut header_ids = HashMap::new();
        for conn in &raw.socket_connections {
            if !conn.pdu_triggering_ref.contains("call") {
                debug!(
                    "skip header id {:#010x}, not a call: {}",
                    conn.header_id, conn.pdu_triggering_ref
                );
                continue;
            }
            if let Some(prev) = header_ids.insert(conn.header_id, conn.pdu_triggering_ref.clone()) {
                warn!(
                    "header id {:#010x} declared twice, {} replaced by {}",
                    conn.header_id, prev, conn.pdu_triggering_ref
                );
            }
        }

        let mut interfaces = HashMap::with_capacity(raw.interfaces.len());
        for (name, operations) in &raw.interfaces {
            let key = canonical_name(name);
            let operations = canonical_table(&format!("operations of {}", name), operations)?;
            if interfaces.insert(key.clone(), operations).is_some() {
                return Err(BuildError::DuplicateKey {
                    table: "interfaces".to_owned(),
                    key,
                });
            }
        }

        let resolver = CpResolver {
            service_instances: raw.service_instances.clone(),
            header_ids,
            pdu_triggerings: canonical_table("pdu triggerings", &raw.pdu_triggerings)?,
            signal_pdus: canonical_table("i-signal pdus", &raw.signal_pdus)?,
            signals: canonical_table("i-signals", &raw.signals)?,
            signal_mappings: raw
                .signal_mappings
                .iter()
                .map(|m| (m.call_signal_ref.clone(), m.target_operation_ref.clone()))
                .collect(),
            interfaces,
        };
        info!(
            "classic: {} service instances, {} call header ids, {} signal mappings, {} interfaces",
            resolver.service_instances.len(),
            resolver.header_ids.len(),
            resolver.signal_mappings.len(),
            resolver.interfaces.len()
        );
        Ok(resolver)
    }

    /// hop 3: pdu triggering -> i-signal pdu -> i-signal -> system signal
    fn system_signal(&self, pdu_triggering_ref: &str) -> Result<&str, ResolveError> {
        let pdu_ref = self
            .pdu_triggerings
            .get(&canonical_key(pdu_triggering_ref))
            .ok_or_else(|| hop(CpHop::PduTriggering, pdu_triggering_ref))?;
        let signal_ref = self
            .signal_pdus
            .get(&canonical_key(pdu_ref))
            .ok_or_else(|| hop(CpHop::SignalPdu, pdu_ref))?;
        let system_signal_ref = self
            .signals
            .get(&canonical_key(signal_ref))
            .ok_or_else(|| hop(CpHop::Signal, signal_ref))?;
        Ok(system_signal_ref.as_str())
    }

    /// hop 4, the first mapping whose key ends with the system signal ref
    fn operation(&self, system_signal_ref: &str) -> Result<&str, ResolveError> {
        let mut matches = self
            .signal_mappings
            .iter()
            .filter(|(key, _)| matches_suffix(key, system_signal_ref));
        let (key, operation_ref) = matches
            .next()
            .ok_or_else(|| hop(CpHop::SignalMapping, system_signal_ref))?;
        if let Some((other, _)) = matches.next() {
            warn!(
                "{} matches both {} and {}, using the first",
                system_signal_ref, key, other
            );
        }
        Ok(operation_ref.as_str())
    }

    /// hop 5: interface is the second-to-last segment, operation the last
    fn argument_type(&self, operation_ref: &str) -> Result<&str, ResolveError> {
        let interface = second_to_last_segment(operation_ref)
            .ok_or_else(|| hop(CpHop::Interface, operation_ref))?;
        let operations = self
            .interfaces
            .get(&canonical_name(interface))
            .ok_or_else(|| hop(CpHop::Interface, interface))?;
        operations
            .get(&canonical_key(operation_ref))
            .map(String::as_str)
            .ok_or_else(|| hop(CpHop::Operation, operation_ref))
    }
}

impl AddressResolver for CpResolver {
    fn resolve(
        &self,
        module: &Module,
        service_id: SomeipServiceId,
        id: u32,
    ) -> Result<Resolved, ResolveError> {
        let instance = self
            .service_instances
            .get(&service_id)
            .ok_or_else(|| hop(CpHop::ServiceInstance, &service_id.to_string()))?;
        let pdu_triggering_ref = self
            .header_ids
            .get(&id)
            .ok_or_else(|| hop(CpHop::HeaderId, &format!("{:#010x}", id)))?;
        let system_signal_ref = self.system_signal(pdu_triggering_ref)?;
        let operation_ref = self.operation(system_signal_ref)?;
        let type_ref = self.argument_type(operation_ref)?;
        debug!(
            "{} {:#010x}: {} -> {} -> {} -> {}",
            instance, id, pdu_triggering_ref, system_signal_ref, operation_ref, type_ref
        );
        Ok(Resolved {
            label: last_segment(type_ref).to_owned(),
            type_id: lookup_type(module, type_ref)?,
        })
    }
}
