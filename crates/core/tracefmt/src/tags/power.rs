//! Execution level, power state and boolean tables.

/// `%!BOOLEAN!`
pub const BOOLEAN_VALUES: &[(u64, &str)] = &[(0, "FALSE"), (1, "TRUE")];

/// `%!IRQL!`: interrupt request levels (x64 numbering).
pub const IRQL_VALUES: &[(u64, &str)] = &[
    (0, "PASSIVE_LEVEL"),
    (1, "APC_LEVEL"),
    (2, "DISPATCH_LEVEL"),
    (13, "CLOCK_LEVEL"),
    (14, "IPI_LEVEL"),
    (15, "HIGH_LEVEL"),
];

/// `%!DEVPOWER!`: device power states.
pub const DEVICE_POWER_STATES: &[(u64, &str)] = &[
    (0, "PowerDeviceUnspecified"),
    (1, "PowerDeviceD0"),
    (2, "PowerDeviceD1"),
    (3, "PowerDeviceD2"),
    (4, "PowerDeviceD3"),
    (5, "PowerDeviceMaximum"),
];

/// `%!SYSPOWER!`: system power states.
pub const SYSTEM_POWER_STATES: &[(u64, &str)] = &[
    (0, "PowerSystemUnspecified"),
    (1, "PowerSystemWorking"),
    (2, "PowerSystemSleeping1"),
    (3, "PowerSystemSleeping2"),
    (4, "PowerSystemSleeping3"),
    (5, "PowerSystemHibernate"),
    (6, "PowerSystemShutdown"),
    (7, "PowerSystemMaximum"),
];
