//! Buffers backed by the generic dumb buffer ioctls.
//!
//! Dumb buffers only support a single plane. The kernel, not the layout calculator,
//! decides their pitch and size.

use {
    crate::{
        bo::{BoPlane, BoState, BufferObject, MapInfo},
        drm::DumbDevice,
        format::{Format, FormatError},
        layout::PlaneLayout,
        utils::{errorfmt::ErrorFmt, mmap::mmap_shared, oserror::OsError},
    },
    std::rc::Rc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum DumbError {
    #[error("Dumb buffers do not support the multi-planar format {0}")]
    UnsupportedMultiPlane(&'static str),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Could not create a {width}x{height} dumb buffer with {bpp} bpp")]
    Create {
        width: u32,
        height: u32,
        bpp: u32,
        #[source]
        source: OsError,
    },
    #[error("Dumb buffer size {0} does not fit into 32 bits")]
    Size(u64),
    #[error("Could not retrieve the map offset of handle {0}")]
    Map(u32, #[source] OsError),
    #[error("Could not map handle {0}")]
    Mmap(u32, #[source] OsError),
    #[error("Could not destroy dumb buffer with handle {0}")]
    Destroy(u32, #[source] OsError),
}

/// Allocates the memory for a single-plane buffer.
pub fn create(
    dev: &dyn DumbDevice,
    format: &'static Format,
    width: u32,
    height: u32,
) -> Result<BoPlane, DumbError> {
    if format.num_planes() != 1 {
        return Err(DumbError::UnsupportedMultiPlane(format.name));
    }
    let bpp = format.bpp(0)?;
    let alloc = match dev.create_dumb(width, height, bpp) {
        Ok(a) => a,
        Err(source) => {
            let e = DumbError::Create {
                width,
                height,
                bpp,
                source,
            };
            log::error!("{}", ErrorFmt(&e));
            return Err(e);
        }
    };
    let size = match u32::try_from(alloc.size) {
        Ok(s) => s,
        Err(_) => {
            if let Err(e) = dev.destroy_dumb(alloc.handle) {
                log::error!(
                    "Could not destroy oversized dumb buffer {}: {}",
                    alloc.handle,
                    ErrorFmt(e)
                );
            }
            return Err(DumbError::Size(alloc.size));
        }
    };
    log::debug!(
        "Created {}x{} {} dumb buffer: handle = {}, pitch = {}, size = {}",
        width,
        height,
        format.name,
        alloc.handle,
        alloc.pitch,
        size,
    );
    Ok(BoPlane {
        handle: alloc.handle,
        layout: PlaneLayout {
            stride: alloc.pitch,
            size,
            offset: 0,
        },
    })
}

/// Maps all planes that share the kernel buffer of `plane`. The caller checks that the
/// plane exists.
pub(crate) fn map(
    dev: &dyn DumbDevice,
    bo: &Rc<BufferObject>,
    plane: usize,
) -> Result<MapInfo, DumbError> {
    let handle = bo.planes[plane].handle;
    let offset = match dev.map_dumb(handle) {
        Ok(o) => o,
        Err(e) => {
            let e = DumbError::Map(handle, e);
            log::error!("{}", ErrorFmt(&e));
            return Err(e);
        }
    };
    let len = bo.handle_len(handle);
    let map = match mmap_shared(len, dev.fd(), offset) {
        Ok(m) => m,
        Err(e) => {
            let e = DumbError::Mmap(handle, e);
            log::error!("{}", ErrorFmt(&e));
            return Err(e);
        }
    };
    bo.maps.set(bo.maps.get() + 1);
    bo.state.set(BoState::Mapped);
    Ok(MapInfo {
        bo: bo.clone(),
        plane,
        map,
    })
}

pub fn destroy(dev: &dyn DumbDevice, bo: &BufferObject) -> Result<(), DumbError> {
    let handle = bo.planes[0].handle;
    if let Err(e) = dev.destroy_dumb(handle) {
        let e = DumbError::Destroy(handle, e);
        log::error!("{}", ErrorFmt(&e));
        return Err(e);
    }
    Ok(())
}
