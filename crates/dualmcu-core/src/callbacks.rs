//! Per-channel indication callbacks (§4.4, §7): one slot per indication
//! kind, each replaceable at runtime, invoked from the dispatcher thread
//! with panics isolated so a misbehaving callback never takes the pump
//! down with it.

use std::{panic::AssertUnwindSafe, sync::Mutex};

use dualmcu_proto::payloads::{
    dsap::DataRxInd,
    msap::{AppConfigRxInd, ConfigDataItemRxInd, ImageRemoteStatusInd, ScanNeighborsInd, StackStateInd},
};
use tracing::error;

type Slot<T> = Mutex<Option<Box<dyn Fn(T) + Send + Sync>>>;

fn empty_slot<T>() -> Slot<T> {
    Mutex::new(None)
}

/// Holds at most one callback per indication channel.
///
/// Callbacks are optional: an indication whose channel has no callback
/// registered is simply dropped after being accounted for by the
/// dispatcher (§4.4 step 4).
pub struct CallbackRegistry {
    data_rx: Slot<DataRxInd>,
    app_config_rx: Slot<AppConfigRxInd>,
    stack_state: Slot<StackStateInd>,
    scan_neighbors_done: Slot<ScanNeighborsInd>,
    remote_status: Slot<ImageRemoteStatusInd>,
    config_data_item_rx: Slot<ConfigDataItemRxInd>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self {
            data_rx: empty_slot(),
            app_config_rx: empty_slot(),
            stack_state: empty_slot(),
            scan_neighbors_done: empty_slot(),
            remote_status: empty_slot(),
            config_data_item_rx: empty_slot(),
        }
    }
}

macro_rules! channel {
    ($set_name:ident, $invoke_name:ident, $slot:ident, $payload:ty, $log:literal) => {
        #[doc = concat!("Installs the callback for the `", $log, "` channel, replacing any previous one.")]
        pub fn $set_name(&self, callback: impl Fn($payload) + Send + Sync + 'static) {
            let mut slot = self.$slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            *slot = Some(Box::new(callback));
        }

        #[doc = concat!("Invokes the `", $log, "` callback if one is registered, isolating any panic.")]
        pub fn $invoke_name(&self, payload: $payload) {
            let slot = self.$slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let Some(callback) = slot.as_ref() else { return };
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
                error!(channel = $log, "indication callback panicked");
            }
        }
    };
}

impl CallbackRegistry {
    channel!(on_data_rx, invoke_data_rx, data_rx, DataRxInd, "data_rx");
    channel!(on_app_config_rx, invoke_app_config_rx, app_config_rx, AppConfigRxInd, "app_config_rx");
    channel!(on_stack_state, invoke_stack_state, stack_state, StackStateInd, "stack_state");
    channel!(
        on_scan_neighbors_done,
        invoke_scan_neighbors_done,
        scan_neighbors_done,
        ScanNeighborsInd,
        "scan_neighbors_done"
    );
    channel!(on_remote_status, invoke_remote_status, remote_status, ImageRemoteStatusInd, "remote_status");
    channel!(
        on_config_data_item_rx,
        invoke_config_data_item_rx,
        config_data_item_rx,
        ConfigDataItemRxInd,
        "config_data_item_rx"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::{AtomicBool, Ordering}, Arc};

    #[test]
    fn uncalled_channel_is_a_silent_no_op() {
        let registry = CallbackRegistry::default();
        registry.invoke_data_rx(DataRxInd {
            indication_status: 0,
            src_addr: 1,
            src_ep: 0,
            dst_addr: 2,
            dst_ep: 0,
            qos_hop: dualmcu_proto::payloads::QosHop { qos: false, hop_count: 0 },
            travel_time: 0,
            fragment: None,
            apdu: vec![],
        });
    }

    #[test]
    fn registered_callback_runs() {
        let registry = CallbackRegistry::default();
        let called = Arc::new(AtomicBool::new(false));
        let called2 = called.clone();
        registry.on_stack_state(move |_ind| called2.store(true, Ordering::SeqCst));
        registry.invoke_stack_state(StackStateInd { indication_status: 0, status: 1 });
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn panicking_callback_is_isolated() {
        let registry = CallbackRegistry::default();
        registry.on_stack_state(|_ind| panic!("boom"));
        // Must not unwind out of invoke_stack_state.
        registry.invoke_stack_state(StackStateInd { indication_status: 0, status: 1 });
    }
}
