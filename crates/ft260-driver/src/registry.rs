//! Named bus openers over enumerated devices, with explicit handle
//! deduplication.
//!
//! Repeated opens of the same bus name must reuse one device handle, since
//! opening a HID device twice either fails or yields a second interface
//! claim. [`DriverCache`] makes that sharing explicit and removable:
//! entries are inserted on first open and removed when the bus built on
//! them is explicitly closed.

use crate::bus::{Ft260I2cBus, I2cBus};
use crate::driver::{Ft260, SharedDriver};
use crate::{DriverError, DriverResult};
use ft260_hid_common::{HidResult, HidTransport, HidapiTransport, enumerate_devices};
use hid_ft260_protocol::{PRODUCT_ID, VENDOR_ID};
use hidapi::HidApi;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Lazily opens a ready-to-use bus.
pub type BusOpener = Box<dyn FnMut() -> DriverResult<Box<dyn I2cBus>> + Send>;

/// Identity-keyed cache of open shared drivers.
pub struct DriverCache {
    entries: Mutex<HashMap<String, SharedDriver>>,
}

impl DriverCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached driver for `name`, or open a transport via
    /// `open` and cache a driver over it.
    ///
    /// # Errors
    /// Propagates the transport open failure.
    pub fn open_or_reuse<F>(&self, name: &str, open: F) -> DriverResult<SharedDriver>
    where
        F: FnOnce() -> HidResult<Box<dyn HidTransport>>,
    {
        let mut entries = self.entries.lock();
        if let Some(dev) = entries.get(name) {
            debug!(bus = name, "reusing open driver handle");
            return Ok(Arc::clone(dev));
        }
        let dev = Ft260::new(open()?).into_shared();
        entries.insert(name.to_string(), Arc::clone(&dev));
        debug!(bus = name, "opened new driver handle");
        Ok(dev)
    }

    /// Drop the cache entry for `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> bool {
        self.entries.lock().remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for DriverCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of named bus openers.
///
/// Created by the process that owns bus discovery; there is no global
/// instance. `open` hands out a fresh bus object per call, backed by a
/// deduplicated driver when the opener was built with a [`DriverCache`].
pub struct BusRegistry {
    openers: HashMap<String, BusOpener>,
}

impl BusRegistry {
    pub fn new() -> Self {
        Self {
            openers: HashMap::new(),
        }
    }

    /// Register an opener under `name`.
    ///
    /// # Errors
    /// Rejects duplicate names.
    pub fn register(&mut self, name: impl Into<String>, opener: BusOpener) -> DriverResult<()> {
        let name = name.into();
        if self.openers.contains_key(&name) {
            return Err(DriverError::AlreadyRegistered(name));
        }
        self.openers.insert(name, opener);
        Ok(())
    }

    /// Remove the opener registered under `name`.
    ///
    /// # Errors
    /// Fails if `name` is not registered.
    pub fn unregister(&mut self, name: &str) -> DriverResult<()> {
        if self.openers.remove(name).is_none() {
            return Err(DriverError::NotRegistered(name.to_string()));
        }
        Ok(())
    }

    /// Invoke the opener registered under `name`.
    ///
    /// # Errors
    /// Fails if `name` is not registered, or with the opener's error.
    pub fn open(&mut self, name: &str) -> DriverResult<Box<dyn I2cBus>> {
        let opener = self
            .openers
            .get_mut(name)
            .ok_or_else(|| DriverError::NotRegistered(name.to_string()))?;
        opener()
    }

    /// Registered bus names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.openers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.openers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openers.is_empty()
    }
}

impl Default for BusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate attached FT260 devices and register one lazy opener per
/// device as `ft260-<index>`. Openers share one [`DriverCache`], so
/// repeated opens of a bus reuse its handle. Returns the number of buses
/// registered.
///
/// # Errors
/// Fails if a bus name is already registered.
pub fn register_ft260_buses(
    api: &Arc<Mutex<HidApi>>,
    registry: &mut BusRegistry,
) -> DriverResult<usize> {
    let cache = Arc::new(DriverCache::new());
    let devices = {
        let api = api.lock();
        enumerate_devices(&api, VENDOR_ID, PRODUCT_ID)
    };

    for (index, info) in devices.iter().enumerate() {
        let name = format!("ft260-{index}");
        info!(bus = %name, path = %info.path, "registering I2C bus");

        let api = Arc::clone(api);
        let cache = Arc::clone(&cache);
        let info = info.clone();
        let bus_name = name.clone();
        registry.register(
            name,
            Box::new(move || {
                let dev = cache.open_or_reuse(&bus_name, || {
                    let api = api.lock();
                    Ok(Box::new(HidapiTransport::open(&api, &info)?) as Box<dyn HidTransport>)
                })?;
                let bus = Ft260I2cBus::new(bus_name.clone(), dev).with_cache(Arc::clone(&cache));
                Ok(Box::new(bus) as Box<dyn I2cBus>)
            }),
        )?;
    }

    Ok(devices.len())
}
