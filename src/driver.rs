
use {
    crate::{
        bo::{BoBackend, BoError, BoIds, BoPlane, BoState, BufferObject, MapInfo},
        config::DrvConfig,
        drm::DumbDevice,
        dumb,
        format::format,
        layout::{Layout, LayoutError, PlaneVec, compute_aligned_layout},
        refcount::HandleRefs,
        utils::errorfmt::ErrorFmt,
    },
    std::{cell::Cell, rc::Rc},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0} GEM handles are still referenced")]
    Leaked(usize),
}

/// A device context: the device, the ownership table of its handles and the buffer
/// objects allocated from it.
pub struct Driver {
    dev: Rc<dyn DumbDevice>,
    config: DrvConfig,
    refs: HandleRefs,
    bo_ids: BoIds,
    live: Cell<usize>,
}

impl Driver {
    pub fn open(dev: Rc<dyn DumbDevice>, config: DrvConfig) -> Rc<Self> {
        log::debug!("Opening driver context with {:?}", config);
        Rc::new(Self {
            dev,
            config,
            refs: Default::default(),
            bo_ids: Default::default(),
            live: Cell::new(0),
        })
    }

    pub fn device(&self) -> &Rc<dyn DumbDevice> {
        &self.dev
    }

    pub fn config(&self) -> &DrvConfig {
        &self.config
    }

    pub fn refs(&self) -> &HandleRefs {
        &self.refs
    }

    /// The number of buffer objects that have been created or imported but not yet
    /// destroyed.
    pub fn live_bos(&self) -> usize {
        self.live.get()
    }

    pub fn layout(&self, drm: u32, width: u32, height: u32) -> Result<Layout, LayoutError> {
        compute_aligned_layout(drm, width, height, self.config.stride_align)
    }

    pub fn create_bo(
        self: &Rc<Self>,
        drm: u32,
        width: u32,
        height: u32,
    ) -> Result<Rc<BufferObject>, BoError> {
        let format = format(drm).map_err(LayoutError::from)?;
        let plane = dumb::create(&*self.dev, format, width, height)?;
        let mut planes = PlaneVec::new();
        planes.push(plane);
        Ok(self.register(BufferObject {
            id: self.bo_ids.next(),
            drv: Rc::downgrade(self),
            format,
            width,
            height,
            backend: BoBackend::Dumb,
            planes,
            total_size: plane.layout.size,
            state: Cell::new(BoState::Allocated),
            maps: Cell::new(0),
        }))
    }

    /// Wraps existing GEM handles, one per plane, in a buffer object. Planes may share
    /// handles. The layout is computed from the format.
    pub fn import_bo(
        self: &Rc<Self>,
        drm: u32,
        width: u32,
        height: u32,
        handles: &[u32],
    ) -> Result<Rc<BufferObject>, BoError> {
        let layout = self.layout(drm, width, height)?;
        if handles.len() != layout.num_planes() {
            return Err(BoError::HandleCount {
                format: layout.format.name,
                planes: layout.num_planes(),
                handles: handles.len(),
            });
        }
        let planes = layout
            .planes
            .iter()
            .zip(handles)
            .map(|(layout, &handle)| BoPlane {
                handle,
                layout: *layout,
            })
            .collect();
        Ok(self.register(BufferObject {
            id: self.bo_ids.next(),
            drv: Rc::downgrade(self),
            format: layout.format,
            width,
            height,
            backend: BoBackend::Gem,
            planes,
            total_size: layout.total_size,
            state: Cell::new(BoState::Allocated),
            maps: Cell::new(0),
        }))
    }

    fn register(&self, bo: BufferObject) -> Rc<BufferObject> {
        for plane in &bo.planes {
            self.refs.increment(plane.handle);
        }
        self.live.set(self.live.get() + 1);
        Rc::new(bo)
    }

    pub fn map_bo(&self, bo: &Rc<BufferObject>, plane: usize) -> Result<MapInfo, BoError> {
        match bo.state() {
            BoState::Allocated | BoState::Mapped | BoState::Unmapped => {}
            s => return Err(BoError::InvalidState(s)),
        }
        bo.plane(plane)?;
        Ok(dumb::map(&*self.dev, bo, plane)?)
    }

    /// Drops this buffer object's references to its handles and releases every handle
    /// that no other buffer object references anymore.
    pub fn destroy_bo(&self, bo: &BufferObject) -> Result<(), BoError> {
        match bo.state() {
            BoState::Allocated | BoState::Unmapped => {}
            BoState::Mapped => return Err(BoError::StillMapped),
            s => return Err(BoError::InvalidState(s)),
        }
        for plane in &bo.planes {
            self.refs.decrement(plane.handle);
        }
        self.live.set(self.live.get() - 1);
        let res = match bo.backend {
            BoBackend::Dumb => {
                if self.refs.get(bo.planes[0].handle) > 0 {
                    Ok(())
                } else {
                    dumb::destroy(&*self.dev, bo).map_err(BoError::from)
                }
            }
            BoBackend::Gem => bo.close_unreferenced_handles(&*self.dev, &self.refs),
        };
        match res {
            Ok(()) => {
                bo.state.set(BoState::Destroyed);
                Ok(())
            }
            Err(e) => {
                bo.state.set(BoState::Indeterminate);
                Err(e)
            }
        }
    }

    /// Closes the context. Buffer objects created from it can no longer be mapped or
    /// destroyed afterwards.
    pub fn close(self: Rc<Self>) -> Result<(), DriverError> {
        let leaked = self.refs.leaked();
        for (handle, count) in &leaked {
            log::warn!("GEM handle {} still has {} references", handle, count);
        }
        if leaked.is_empty() {
            return Ok(());
        }
        let e = DriverError::Leaked(leaked.len());
        if self.config.fail_on_leak {
            return Err(e);
        }
        log::warn!("{}", ErrorFmt(&e));
        Ok(())
    }
}
