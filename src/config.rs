use {
    once_cell::sync::Lazy,
    std::{env, str::FromStr},
};

pub const JAY_DRV_STRIDE_ALIGN: &str = "JAY_DRV_STRIDE_ALIGN";
pub const JAY_DRV_FAIL_ON_LEAK: &str = "JAY_DRV_FAIL_ON_LEAK";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DrvConfig {
    /// Row pitch alignment, in bytes, applied by the layout calculator. Always a power
    /// of two.
    pub stride_align: u32,
    /// Whether closing a driver with live handles is an error or only a warning.
    pub fail_on_leak: bool,
}

impl Default for DrvConfig {
    fn default() -> Self {
        Self {
            stride_align: 1,
            fail_on_leak: true,
        }
    }
}

static ENV_CONFIG: Lazy<DrvConfig> = Lazy::new(|| {
    let mut config = DrvConfig::default();
    if let Some(align) = parse_var::<u32>(JAY_DRV_STRIDE_ALIGN) {
        if align.is_power_of_two() {
            config.stride_align = align;
        } else {
            log::warn!(
                "Ignoring {}={}: not a power of two",
                JAY_DRV_STRIDE_ALIGN,
                align
            );
        }
    }
    if let Ok(v) = env::var(JAY_DRV_FAIL_ON_LEAK) {
        config.fail_on_leak = v != "0";
    }
    config
});

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let v = env::var(name).ok()?;
    match v.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {}={}: not a number", name, v);
            None
        }
    }
}

impl DrvConfig {
    /// The configuration from the environment. Read once per process.
    pub fn from_env() -> Self {
        *ENV_CONFIG
    }

    pub fn with_stride_align(self, stride_align: u32) -> Self {
        assert!(stride_align.is_power_of_two());
        Self {
            stride_align,
            ..self
        }
    }
}

#[test]
fn stride_align_override() {
    let config = DrvConfig::default();
    assert_eq!(config.stride_align, 1);
    assert!(config.fail_on_leak);
    assert_eq!(config.with_stride_align(256).stride_align, 256);
}

#[test]
#[should_panic]
fn stride_align_must_be_power_of_two() {
    DrvConfig::default().with_stride_align(48);
}
