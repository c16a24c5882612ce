use {
    std::{
        error::Error,
        fmt::{Display, Formatter},
    },
    uapi::{Errno, c},
};

// The errnos DRM and mmap actually report. Everything else is printed by number.
static MSGS: &[(c::c_int, &str)] = &[
    (c::EPERM, "Operation not permitted"),
    (c::ENOENT, "No such file or directory"),
    (c::EINTR, "Interrupted system call"),
    (c::EIO, "Input/output error"),
    (c::ENXIO, "No such device or address"),
    (c::EBADF, "Bad file descriptor"),
    (c::EAGAIN, "Resource temporarily unavailable"),
    (c::ENOMEM, "Cannot allocate memory"),
    (c::EACCES, "Permission denied"),
    (c::EFAULT, "Bad address"),
    (c::EBUSY, "Device or resource busy"),
    (c::ENODEV, "No such device"),
    (c::EINVAL, "Invalid argument"),
    (c::ENFILE, "Too many open files in system"),
    (c::EMFILE, "Too many open files"),
    (c::ENOTTY, "Inappropriate ioctl for device"),
    (c::ENOSPC, "No space left on device"),
    (c::ERANGE, "Numerical result out of range"),
    (c::ENOSYS, "Function not implemented"),
    (c::EOVERFLOW, "Value too large for defined data type"),
    (c::EOPNOTSUPP, "Operation not supported"),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct OsError(pub c::c_int);

impl From<Errno> for OsError {
    fn from(e: Errno) -> Self {
        Self(e.0)
    }
}

impl From<c::c_int> for OsError {
    fn from(v: c::c_int) -> Self {
        Self(v)
    }
}

impl Default for OsError {
    fn default() -> Self {
        Errno::default().into()
    }
}

impl Error for OsError {}

impl Display for OsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = MSGS
            .iter()
            .find(|(e, _)| *e == self.0)
            .map(|(_, m)| *m)
            .unwrap_or("unknown error");
        write!(f, "{} (os error {})", msg, self.0)
    }
}
