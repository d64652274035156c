// self
use crate::{
	address::{AddressBook, AddressKind},
	auth::EntryId,
	obs::{FlowKind, FlowOutcome},
};

/// Counts one endpoint call outcome as `baemin_flow_total{flow, outcome}`.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"baemin_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Publishes the size of an entry's snapshot as `baemin_saved_addresses{entry, kind}`.
pub fn record_address_snapshot(entry_id: &EntryId, book: &AddressBook) {
	for kind in AddressKind::ALL {
		let count = book.of_kind(kind).len();

		#[cfg(feature = "metrics")]
		{
			metrics::gauge!(
				"baemin_saved_addresses",
				"entry" => entry_id.to_string(),
				"kind" => kind.as_str()
			)
			.set(count as f64);
		}

		#[cfg(not(feature = "metrics"))]
		{
			let _ = (entry_id, count);
		}
	}
}

/// Zeroes the snapshot gauges of an unloaded entry.
pub fn clear_address_snapshot(entry_id: &EntryId) {
	record_address_snapshot(entry_id, &AddressBook::default());
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_are_noops_without_an_installed_recorder() {
		let entry_id = EntryId::new("entry-1").expect("Entry fixture should be valid.");

		record_flow_outcome(FlowKind::Addresses, FlowOutcome::Failure);
		record_address_snapshot(&entry_id, &AddressBook::default());
		clear_address_snapshot(&entry_id);
	}
}
