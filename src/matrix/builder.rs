//! Builds a [`Module`] from raw data type declarations.
//!
//! Resolution runs in passes over the same input:
//! 1. primitives and strings become nodes, every record reserves its slot,
//! 2. arrays and sequences are resolved repeatedly until no more progress
//!    is made, so containers of containers work in any declaration order,
//! 3. record fields are resolved against the complete table.
//!
//! The finished graph is checked for records that contain themselves
//! without a sequence in between.

use std::collections::{HashMap, HashSet};

use log::{debug, info, trace};

use super::raw::{RawDataType, RawDescriptor, RawElement};
use super::reference::{canonical_key, canonical_name};
use super::types::{
    MatrixType, Module, NumberType, RecordDef, RecordField, RecordId, StringLength, TypeId,
};
use crate::errors::BuildError;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Primitive {
    Number(NumberType),
    String,
}

/// Fragments tested in order against the lower-cased type name; the first
/// match wins, so more specific fragments come first.
const PRIMITIVE_FRAGMENTS: &[(&str, Primitive)] = &[
    ("string", Primitive::String),
    ("bool", Primitive::Number(NumberType::Boolean)),
    ("uint8", Primitive::Number(NumberType::Uint8)),
    ("uint16", Primitive::Number(NumberType::Uint16)),
    ("uint32", Primitive::Number(NumberType::Uint32)),
    ("uint64", Primitive::Number(NumberType::Uint64)),
    ("int8", Primitive::Number(NumberType::Sint8)),
    ("int16", Primitive::Number(NumberType::Sint16)),
    ("int32", Primitive::Number(NumberType::Sint32)),
    ("int64", Primitive::Number(NumberType::Sint64)),
    ("float64", Primitive::Number(NumberType::Float64)),
    ("float32", Primitive::Number(NumberType::Float32)),
    ("double", Primitive::Number(NumberType::Float64)),
    ("float", Primitive::Number(NumberType::Float32)),
];

fn match_primitive(type_ref: &str) -> Option<Primitive> {
    let name = canonical_key(type_ref);
    PRIMITIVE_FRAGMENTS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, primitive)| *primitive)
}

fn primitive_type(type_ref: &str, string_size: Option<u32>) -> Result<MatrixType, BuildError> {
    match match_primitive(type_ref) {
        Some(Primitive::Number(size)) => Ok(MatrixType::Number { size }),
        Some(Primitive::String) => Ok(MatrixType::String {
            length: match string_size {
                Some(width) if width > 0 => StringLength::Fixed(width),
                _ => StringLength::Dynamic,
            },
        }),
        None => Err(BuildError::UnknownPrimitiveReference(type_ref.to_owned())),
    }
}

pub fn build_module(name: &str, data_types: &[RawDataType]) -> Result<Module, BuildError> {
    let mut builder = ModuleBuilder::new(name);
    builder.check_names(data_types)?;
    let record_slots = builder.fill_leaves(data_types)?;
    builder.fill_containers(data_types)?;
    builder.fill_records(data_types, &record_slots)?;
    let module = builder.finish()?;
    check_recursion(&module)?;
    info!(
        "module {} built: {} types, {} records",
        module.name,
        module.type_count(),
        module.records.len()
    );
    Ok(module)
}

struct ModuleBuilder {
    name: String,
    nodes: Vec<MatrixType>,
    node_names: Vec<String>,
    types_by_name: HashMap<String, TypeId>,
    records: Vec<Option<RecordDef>>,
}

impl ModuleBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            nodes: Vec::new(),
            node_names: Vec::new(),
            types_by_name: HashMap::new(),
            records: Vec::new(),
        }
    }

    fn check_names(&self, data_types: &[RawDataType]) -> Result<(), BuildError> {
        let mut seen = HashSet::new();
        for dt in data_types {
            if dt.short_name.is_empty() {
                return Err(BuildError::MissingField {
                    owner: format!("data types of module {}", self.name),
                    field: "short_name",
                });
            }
            if !seen.insert(canonical_name(&dt.short_name)) {
                return Err(BuildError::DuplicateType(dt.short_name.clone()));
            }
        }
        Ok(())
    }

    fn insert(&mut self, short_name: &str, node: MatrixType) -> TypeId {
        let id = TypeId(self.nodes.len());
        trace!("{} -> {:?}", short_name, node);
        self.nodes.push(node);
        self.node_names.push(short_name.to_owned());
        self.types_by_name.insert(canonical_name(short_name), id);
        id
    }

    fn resolve(&self, owner: &str, reference: &str) -> Result<TypeId, BuildError> {
        self.types_by_name
            .get(&canonical_key(reference))
            .copied()
            .ok_or_else(|| BuildError::UnresolvedReference {
                owner: owner.to_owned(),
                reference: reference.to_owned(),
            })
    }

    /// pass 1, returns the record slot reserved for each declaration index
    fn fill_leaves(
        &mut self,
        data_types: &[RawDataType],
    ) -> Result<HashMap<usize, RecordId>, BuildError> {
        let mut slots = HashMap::new();
        for (index, dt) in data_types.iter().enumerate() {
            match &dt.descriptor {
                RawDescriptor::Primitive {
                    type_ref,
                    string_size,
                } => {
                    if type_ref.is_empty() {
                        return Err(BuildError::MissingField {
                            owner: dt.short_name.clone(),
                            field: "type_ref",
                        });
                    }
                    let node = primitive_type(type_ref, *string_size)?;
                    self.insert(&dt.short_name, node);
                }
                RawDescriptor::Record { .. } => {
                    let record = RecordId(self.records.len());
                    self.records.push(None);
                    self.insert(&dt.short_name, MatrixType::Struct { record });
                    slots.insert(index, record);
                }
                RawDescriptor::Array { .. } => {}
            }
        }
        debug!(
            "{} leaf types and {} record slots",
            self.nodes.len() - slots.len(),
            slots.len()
        );
        Ok(slots)
    }

    /// pass 2
    fn fill_containers(&mut self, data_types: &[RawDataType]) -> Result<(), BuildError> {
        let mut pending: Vec<(&str, u32, &str)> = data_types
            .iter()
            .filter_map(|dt| match &dt.descriptor {
                RawDescriptor::Array {
                    array_size,
                    element_ref,
                } => Some((dt.short_name.as_str(), *array_size, element_ref.as_str())),
                _ => None,
            })
            .collect();

        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::with_capacity(before);
            for (short_name, count, element_ref) in pending {
                match self.types_by_name.get(&canonical_key(element_ref)).copied() {
                    Some(element) => {
                        let node = if count > 0 {
                            MatrixType::Array { element, count }
                        } else {
                            MatrixType::Sequence { element }
                        };
                        self.insert(short_name, node);
                    }
                    None => waiting.push((short_name, count, element_ref)),
                }
            }
            if waiting.len() == before {
                let (short_name, _, element_ref) = waiting[0];
                return Err(BuildError::UnresolvedReference {
                    owner: short_name.to_owned(),
                    reference: element_ref.to_owned(),
                });
            }
            pending = waiting;
        }
        Ok(())
    }

    /// pass 3
    fn fill_records(
        &mut self,
        data_types: &[RawDataType],
        slots: &HashMap<usize, RecordId>,
    ) -> Result<(), BuildError> {
        for (index, dt) in data_types.iter().enumerate() {
            let RawDescriptor::Record { elements } = &dt.descriptor else {
                continue;
            };
            let Some(record) = slots.get(&index) else {
                continue;
            };
            let def = self.record_def(&dt.short_name, elements)?;
            debug!("record {} with {} fields", def.name, def.fields.len());
            self.records[record.0] = Some(def);
        }
        Ok(())
    }

    fn record_def(&self, name: &str, elements: &[RawElement]) -> Result<RecordDef, BuildError> {
        if elements.is_empty() {
            return Err(BuildError::MissingField {
                owner: format!("record {}", name),
                field: "elements",
            });
        }
        let mut fields: Vec<RecordField> = Vec::with_capacity(elements.len());
        for element in elements {
            if element.short_name.is_empty() {
                return Err(BuildError::MissingField {
                    owner: format!("record {}", name),
                    field: "short_name",
                });
            }
            if fields.iter().any(|f| f.name == element.short_name) {
                return Err(BuildError::DuplicateField {
                    record: name.to_owned(),
                    field: element.short_name.clone(),
                });
            }
            let owner = format!("{}.{}", name, element.short_name);
            fields.push(RecordField {
                name: element.short_name.clone(),
                data_type: self.resolve(&owner, &element.type_ref)?,
            });
        }
        Ok(RecordDef {
            name: name.to_owned(),
            fields,
        })
    }

    fn finish(self) -> Result<Module, BuildError> {
        let mut records = Vec::with_capacity(self.records.len());
        for (index, slot) in self.records.into_iter().enumerate() {
            match slot {
                Some(def) => records.push(def),
                None => {
                    let name = self
                        .nodes
                        .iter()
                        .position(|n| *n == MatrixType::Struct { record: RecordId(index) })
                        .map(|i| self.node_names[i].clone())
                        .unwrap_or_default();
                    return Err(BuildError::UnresolvedReference {
                        owner: self.name,
                        reference: name,
                    });
                }
            }
        }
        Ok(Module {
            name: self.name,
            nodes: self.nodes,
            node_names: self.node_names,
            types_by_name: self.types_by_name,
            records,
        })
    }
}

/// records stored inline by `ty`; sequences break the chain
fn inline_records(module: &Module, ty: TypeId, out: &mut Vec<RecordId>) {
    match module.node(ty) {
        Some(MatrixType::Struct { record }) => out.push(*record),
        Some(MatrixType::Array { element, .. }) => inline_records(module, *element, out),
        _ => {}
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    New,
    Active,
    Done,
}

fn check_recursion(module: &Module) -> Result<(), BuildError> {
    let mut state = vec![Visit::New; module.records.len()];
    for index in 0..module.records.len() {
        visit(module, RecordId(index), &mut state)?;
    }
    Ok(())
}

fn visit(module: &Module, record: RecordId, state: &mut [Visit]) -> Result<(), BuildError> {
    match state[record.0] {
        Visit::Done => return Ok(()),
        Visit::Active => {
            return Err(BuildError::RecursiveRecord(
                module.records[record.0].name.clone(),
            ))
        }
        Visit::New => {}
    }
    state[record.0] = Visit::Active;
    let mut children = Vec::new();
    for field in &module.records[record.0].fields {
        inline_records(module, field.data_type, &mut children);
    }
    for child in children {
        visit(module, child, state)?;
    }
    state[record.0] = Visit::Done;
    Ok(())
}
