use std::path::Path;

use log::{debug, info};

use crate::decoder::{PayloadDecoder, Value};
use crate::errors::{BuildError, MyError, ResolveError};
use crate::matrix::{build_module, ConfigDocument, Module};
use crate::resolver::{AddressResolver, Resolved, Resolver};
use crate::types::{SerializationParameter, SomeipServiceId};

/// 配置文档加载后的完整转换器：类型图 + 寻址方式 + 解码参数
///
/// Immutable once built. A changed configuration means a new converter.
#[derive(Debug, Clone)]
pub struct SomeipConverter {
    module: Module,
    resolver: Resolver,
    config: SerializationParameter,
}

impl SomeipConverter {
    pub fn from_document(
        doc: &ConfigDocument,
        config: SerializationParameter,
    ) -> Result<SomeipConverter, BuildError> {
        let module = build_module(&doc.name, &doc.data_types)?;
        let resolver = Resolver::from_document(doc)?;
        info!(
            "converter ready: {} types, {} addressing",
            module.type_count(),
            resolver.platform()
        );
        Ok(SomeipConverter {
            module,
            resolver,
            config,
        })
    }

    pub fn from_json_file<P>(path: P, config: SerializationParameter) -> Result<Self, MyError>
    where
        P: AsRef<Path>,
    {
        let doc = ConfigDocument::from_json_file(path)?;
        Ok(Self::from_document(&doc, config)?)
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn config(&self) -> &SerializationParameter {
        &self.config
    }

    /// Resolution only: the label and root type for `(service_id, id)`.
    pub fn type_by_id(&self, service_id: SomeipServiceId, id: u32) -> Result<Resolved, ResolveError> {
        self.resolver.resolve(&self.module, service_id, id)
    }

    /// Resolve and decode one payload. Bytes after the decoded value are
    /// ignored.
    pub fn convert(
        &self,
        service_id: SomeipServiceId,
        id: u32,
        data: &[u8],
    ) -> Result<(String, Value), MyError> {
        let Resolved { label, type_id } = self.type_by_id(service_id, id)?;
        let decoder = PayloadDecoder::new(&self.module, self.config);
        let (value, rest) = decoder.decode(type_id, &label, data)?;
        if !rest.is_empty() {
            debug!("{}: {} trailing bytes ignored", label, rest.len());
        }
        Ok((label, value))
    }
}
