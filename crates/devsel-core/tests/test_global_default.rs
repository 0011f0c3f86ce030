//! End-to-end test of the process-wide selector.
//!
//! Kept as a single test in its own binary: it mutates process-wide state
//! that parallel tests would otherwise race on.

use devsel_core::config::DEVICE_ENV_VAR;
use devsel_core::prelude::*;

#[test]
fn test_process_wide_device_lifecycle() {
    std::env::remove_var(DEVICE_ENV_VAR);

    // Historic default
    assert_eq!(get_global_device_type(), Device::Gpu);
    assert_eq!(effective_device(), Device::Gpu);

    set_global_device_type("cpu").unwrap();
    assert_eq!(get_global_device_type(), Device::Cpu);

    let err = set_global_device_type("tpu").unwrap_err();
    assert!(err.is_invalid_device());
    assert_eq!(get_global_device_type(), Device::Cpu);

    {
        let _scope = using_device_type(Device::Gpu).unwrap();
        assert_eq!(effective_device(), Device::Gpu);
        assert_eq!(get_global_device_type(), Device::Cpu);
    }
    assert_eq!(effective_device(), Device::Cpu);

    // Another thread sees the new global value but not this thread's scope
    let _scope = using_device_type(Device::Gpu).unwrap();
    let seen = std::thread::spawn(effective_device).join().unwrap();
    assert_eq!(seen, Device::Cpu);

    // The dispatcher follows the process-wide selector
    let dispatcher = Dispatcher::global();
    assert!(std::ptr::eq(dispatcher.selector(), global_selector()));
    assert_eq!(dispatcher.selector().effective_device(), Device::Gpu);

    global_selector().reset_global_device();
    assert_eq!(get_global_device_type(), Device::Gpu);
}
