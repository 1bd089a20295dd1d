//! C bridge to the plugin registry
//!
//! Read-only enumeration of registered factories for C callers. All types use
//! `#[repr(C)]`; every string handed out is interned and stays valid for the
//! rest of the process. Out-of-range indices yield null handles and null
//! strings instead of failing.

use crate::registry::{FactoryRecord, Registry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{c_char, CString};
use std::os::raw::c_int;
use std::ptr;
use std::sync::{Arc, OnceLock};

/// Handle to a registry
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CPluginService {
    /// Registry the handle enumerates
    pub registry: *const Registry,
}

impl CPluginService {
    /// Create a null handle
    pub const fn null() -> Self {
        Self {
            registry: ptr::null(),
        }
    }

    /// Handle for a registry that lives for the rest of the process
    pub fn from_registry(registry: &'static Registry) -> Self {
        Self { registry }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.registry.is_null()
    }

    fn registry(&self) -> Option<&'static Registry> {
        // Safety: non-null handles are only built from `&'static Registry`
        unsafe { self.registry.as_ref() }
    }
}

unsafe impl Send for CPluginService {}
unsafe impl Sync for CPluginService {}

/// Handle to one registered factory
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CFactory {
    /// Registry owning the factory
    pub registry: *const Registry,
    /// Interned identifier, null for the null handle
    pub id: *const c_char,
}

impl CFactory {
    /// Create a null handle
    pub const fn null() -> Self {
        Self {
            registry: ptr::null(),
            id: ptr::null(),
        }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.registry.is_null() || self.id.is_null()
    }

    fn record(&self) -> Option<Arc<FactoryRecord>> {
        if self.is_null() {
            return None;
        }
        let service = CPluginService {
            registry: self.registry,
        };
        // Safety: `id` points into the intern table, which is never shrunk
        let id = unsafe { std::ffi::CStr::from_ptr(self.id) }.to_str().ok()?;
        service.registry()?.registered(id)
    }
}

unsafe impl Send for CFactory {}
unsafe impl Sync for CFactory {}

/// Handle to one factory property
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CProperty {
    /// Interned key
    pub key: *const c_char,
    /// Interned value
    pub value: *const c_char,
}

impl CProperty {
    /// Create a null handle
    pub const fn null() -> Self {
        Self {
            key: ptr::null(),
            value: ptr::null(),
        }
    }

    /// Check if handle is null
    pub fn is_null(&self) -> bool {
        self.key.is_null()
    }
}

unsafe impl Send for CProperty {}
unsafe impl Sync for CProperty {}

fn interned() -> &'static Mutex<HashMap<String, CString>> {
    static STRINGS: OnceLock<Mutex<HashMap<String, CString>>> = OnceLock::new();
    STRINGS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Process-lifetime C copy of a string
///
/// Interior NUL bytes are dropped from the C copy.
pub fn intern(value: &str) -> *const c_char {
    let mut strings = interned().lock();
    if let Some(existing) = strings.get(value) {
        return existing.as_ptr();
    }

    let c_string = CString::new(value.replace('\0', "")).unwrap_or_default();
    let pointer = c_string.as_ptr();
    strings.insert(value.to_string(), c_string);
    pointer
}

fn to_index(n: c_int) -> Option<usize> {
    usize::try_from(n).ok()
}

fn factory_string(factory: CFactory, field: impl Fn(&FactoryRecord) -> &str) -> *const c_char {
    match factory.record() {
        Some(record) => intern(field(record.as_ref())),
        None => ptr::null(),
    }
}

// ========== Service ==========

/// Handle to the process-wide registry
#[no_mangle]
pub extern "C" fn void_pluginsvc_instance() -> CPluginService {
    CPluginService::from_registry(Registry::instance())
}

/// Number of registered factories
#[no_mangle]
pub extern "C" fn void_pluginsvc_get_factory_size(service: CPluginService) -> c_int {
    service
        .registry()
        .map(|registry| c_int::try_from(registry.factory_count()).unwrap_or(c_int::MAX))
        .unwrap_or(0)
}

/// Factory at a position in identifier order
#[no_mangle]
pub extern "C" fn void_pluginsvc_get_factory_at(service: CPluginService, n: c_int) -> CFactory {
    let registry = match service.registry() {
        Some(registry) => registry,
        None => return CFactory::null(),
    };

    match to_index(n).and_then(|n| registry.factory_at(n)) {
        Some(record) => CFactory {
            registry: service.registry,
            id: intern(record.id()),
        },
        None => CFactory::null(),
    }
}

// ========== Factory ==========

/// Library that registered the factory
#[no_mangle]
pub extern "C" fn void_factory_get_library(factory: CFactory) -> *const c_char {
    factory_string(factory, FactoryRecord::library)
}

/// Name of the factory signature type
#[no_mangle]
pub extern "C" fn void_factory_get_type(factory: CFactory) -> *const c_char {
    factory_string(factory, FactoryRecord::signature_type_name)
}

/// Name of the factory return type
#[no_mangle]
pub extern "C" fn void_factory_get_rtype(factory: CFactory) -> *const c_char {
    factory_string(factory, FactoryRecord::return_type_name)
}

/// Name of the constructed component type
#[no_mangle]
pub extern "C" fn void_factory_get_classname(factory: CFactory) -> *const c_char {
    factory_string(factory, FactoryRecord::class_name)
}

/// Number of properties attached to the factory
#[no_mangle]
pub extern "C" fn void_factory_get_property_size(factory: CFactory) -> c_int {
    factory
        .record()
        .map(|record| c_int::try_from(record.properties().len()).unwrap_or(c_int::MAX))
        .unwrap_or(0)
}

/// Property at a position in key order
#[no_mangle]
pub extern "C" fn void_factory_get_property_at(factory: CFactory, n: c_int) -> CProperty {
    let record = match factory.record() {
        Some(record) => record,
        None => return CProperty::null(),
    };

    match to_index(n).and_then(|n| record.properties().get_at(n)) {
        Some((key, value)) => CProperty {
            key: intern(key),
            value: intern(value),
        },
        None => CProperty::null(),
    }
}

// ========== Property ==========

/// Property key
#[no_mangle]
pub extern "C" fn void_property_get_key(property: CProperty) -> *const c_char {
    property.key
}

/// Property value
#[no_mangle]
pub extern "C" fn void_property_get_value(property: CProperty) -> *const c_char {
    if property.is_null() {
        return ptr::null();
    }
    property.value
}
