// Copyright (C) 2024-present The Pced Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Traffic-engineering controller: the LSP state database and the policy
//! that turns incoming state reports into path updates for delegated LSPs.

use std::{
    collections::BTreeMap,
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex},
};

use pcep_pkt::{
    BandwidthObject, ExplicitRouteObject, LspObject, LspaObject, PathSubobject, PcepObject,
    RecordRouteObject, StateReportMessage, UpdateMessage,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// PLSP-IDs are unique per PCC only; the database key carries both.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct LspKey {
    pcc: IpAddr,
    plsp_id: u32,
}

impl LspKey {
    pub const fn new(pcc: IpAddr, plsp_id: u32) -> Self {
        Self { pcc, plsp_id }
    }

    pub const fn pcc(&self) -> IpAddr {
        self.pcc
    }

    pub const fn plsp_id(&self) -> u32 {
        self.plsp_id
    }
}

/// Everything we learned about one LSP from its latest state report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LspRecord {
    lsp: LspObject,
    explicit_route: Option<ExplicitRouteObject>,
    record_route: Option<RecordRouteObject>,
    attributes: Option<LspaObject>,
    bandwidth: Option<BandwidthObject>,
}

impl LspRecord {
    const fn new(lsp: LspObject) -> Self {
        Self {
            lsp,
            explicit_route: None,
            record_route: None,
            attributes: None,
            bandwidth: None,
        }
    }

    pub const fn lsp(&self) -> &LspObject {
        &self.lsp
    }

    pub const fn explicit_route(&self) -> Option<&ExplicitRouteObject> {
        self.explicit_route.as_ref()
    }

    pub const fn record_route(&self) -> Option<&RecordRouteObject> {
        self.record_route.as_ref()
    }

    pub const fn attributes(&self) -> Option<&LspaObject> {
        self.attributes.as_ref()
    }

    pub const fn bandwidth(&self) -> Option<&BandwidthObject> {
        self.bandwidth.as_ref()
    }

    pub const fn delegated(&self) -> bool {
        self.lsp.delegate()
    }
}

/// LSP state database across all connected PCCs. Keyed by `(pcc, plsp-id)`
/// so iteration order is stable.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct LspDb {
    lsps: BTreeMap<LspKey, LspRecord>,
}

impl LspDb {
    pub fn len(&self) -> usize {
        self.lsps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lsps.is_empty()
    }

    pub fn get(&self, key: &LspKey) -> Option<&LspRecord> {
        self.lsps.get(key)
    }

    /// Fold one state report into the database. A PCRpt message carries one
    /// or more `<LSP> <path>` sequences; objects between two LSP objects
    /// attach to the preceding one. An LSP object with the R flag set
    /// deletes its record.
    pub fn apply_report(&mut self, pcc: IpAddr, report: &StateReportMessage) {
        let mut current: Option<LspKey> = None;
        for object in report.objects() {
            match object {
                PcepObject::Lsp(lsp) => {
                    let key = LspKey::new(pcc, lsp.plsp_id());
                    if lsp.remove() {
                        if self.lsps.remove(&key).is_some() {
                            info!("removed LSP {} of PCC {pcc}", lsp.plsp_id());
                        }
                        current = None;
                    } else {
                        self.lsps.insert(key, LspRecord::new(lsp.clone()));
                        current = Some(key);
                    }
                }
                PcepObject::ExplicitRoute(ero) => {
                    if let Some(record) = current.and_then(|key| self.lsps.get_mut(&key)) {
                        record.explicit_route = Some(ero.clone());
                    }
                }
                PcepObject::RecordRoute(rro) => {
                    if let Some(record) = current.and_then(|key| self.lsps.get_mut(&key)) {
                        record.record_route = Some(rro.clone());
                    }
                }
                PcepObject::Lspa(lspa) => {
                    if let Some(record) = current.and_then(|key| self.lsps.get_mut(&key)) {
                        record.attributes = Some(lspa.clone());
                    }
                }
                PcepObject::Bandwidth(bandwidth) | PcepObject::ExistingBandwidth(bandwidth) => {
                    if let Some(record) = current.and_then(|key| self.lsps.get_mut(&key)) {
                        record.bandwidth = Some(bandwidth.clone());
                    }
                }
                // SRP correlates a report with an earlier update, no state
                PcepObject::Srp(_) => {}
                other => {
                    trace!(
                        "ignoring object {:?} in state report from {pcc}",
                        other.class_and_type()
                    );
                }
            }
        }
    }

    /// Records delegated to us by the given PCC, in PLSP-ID order.
    pub fn delegated(&self, pcc: IpAddr) -> impl Iterator<Item = &LspRecord> {
        self.lsps
            .iter()
            .filter(move |(key, record)| key.pcc() == pcc && record.delegated())
            .map(|(_, record)| record)
    }

    /// Drop all state learned from a PCC, used when its session ends.
    pub fn remove_pcc(&mut self, pcc: IpAddr) {
        let before = self.lsps.len();
        self.lsps.retain(|key, _| key.pcc() != pcc);
        let removed = before - self.lsps.len();
        if removed > 0 {
            info!("purged {removed} LSPs of disconnected PCC {pcc}");
        }
    }
}

/// Shared controller handed to every PCC session. Ingests state reports and
/// answers with a PCUpd re-delegating the paths of all LSPs the PCC
/// delegated to us.
#[derive(Debug, Default, Clone)]
pub struct TeController {
    db: Arc<Mutex<LspDb>>,
}

impl TeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lsp_count(&self) -> usize {
        self.db.lock().expect("lsp db lock poisoned").len()
    }

    /// Fold a state report into the database and, when the reporting PCC
    /// holds delegated LSPs, build the update message confirming their
    /// intended paths.
    pub fn handle_report(
        &self,
        pcc: IpAddr,
        report: &StateReportMessage,
    ) -> Option<UpdateMessage> {
        let mut db = self.db.lock().expect("lsp db lock poisoned");
        db.apply_report(pcc, report);
        debug!("lsp db holds {} records", db.len());

        let mut objects = Vec::new();
        for record in db.delegated(pcc) {
            let lsp = record.lsp();
            objects.push(PcepObject::Lsp(LspObject::new(
                lsp.plsp_id(),
                true,
                false,
                false,
                lsp.administrative(),
                lsp.operational(),
                lsp.tlvs().clone(),
            )));
            objects.push(PcepObject::ExplicitRoute(
                record
                    .explicit_route()
                    .cloned()
                    .unwrap_or_else(placeholder_route),
            ));
            if let Some(attributes) = record.attributes() {
                objects.push(PcepObject::Lspa(attributes.clone()));
            }
            if let Some(bandwidth) = record.bandwidth() {
                objects.push(PcepObject::Bandwidth(bandwidth.clone()));
            }
        }
        if objects.is_empty() {
            None
        } else {
            Some(UpdateMessage::new(objects))
        }
    }

    /// Forget everything a PCC reported once its session is gone.
    pub fn remove_pcc(&self, pcc: IpAddr) {
        self.db.lock().expect("lsp db lock poisoned").remove_pcc(pcc);
    }
}

/// Intended path sent when the PCC never reported one: a single strict
/// zero-prefix hop, leaving the actual path to the PCC.
fn placeholder_route() -> ExplicitRouteObject {
    ExplicitRouteObject::new(vec![PathSubobject::Ipv4Prefix {
        loose: false,
        address: Ipv4Addr::UNSPECIFIED,
        prefix_length: 0,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcep_pkt::iana::LspOperationalStatus;

    fn pcc() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))
    }

    fn lsp_object(plsp_id: u32, delegate: bool, remove: bool) -> PcepObject {
        PcepObject::Lsp(LspObject::new(
            plsp_id,
            delegate,
            false,
            remove,
            true,
            LspOperationalStatus::Up,
            vec![],
        ))
    }

    fn ero(address: Ipv4Addr) -> ExplicitRouteObject {
        ExplicitRouteObject::new(vec![PathSubobject::Ipv4Prefix {
            loose: false,
            address,
            prefix_length: 32,
        }])
    }

    #[test]
    fn test_report_populates_db() {
        let controller = TeController::new();
        let report = StateReportMessage::new(vec![
            lsp_object(1, false, false),
            PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 1))),
            PcepObject::Bandwidth(BandwidthObject::new(1_000_000)),
        ]);

        let update = controller.handle_report(pcc(), &report);
        assert!(update.is_none());
        assert_eq!(controller.lsp_count(), 1);

        let db = controller.db.lock().unwrap();
        let record = db.get(&LspKey::new(pcc(), 1)).unwrap();
        assert!(!record.delegated());
        assert_eq!(record.explicit_route(), Some(&ero(Ipv4Addr::new(10, 0, 0, 1))));
        assert_eq!(record.bandwidth(), Some(&BandwidthObject::new(1_000_000)));
        assert_eq!(record.record_route(), None);
    }

    #[test]
    fn test_delegated_lsp_triggers_update() {
        let controller = TeController::new();
        let report = StateReportMessage::new(vec![
            lsp_object(7, true, false),
            PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 7))),
        ]);

        let update = controller.handle_report(pcc(), &report).unwrap();
        assert_eq!(
            update.objects(),
            &vec![
                lsp_object(7, true, false),
                PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 7))),
            ]
        );
    }

    #[test]
    fn test_update_without_reported_path_uses_placeholder() {
        let controller = TeController::new();
        let report = StateReportMessage::new(vec![lsp_object(3, true, false)]);

        let update = controller.handle_report(pcc(), &report).unwrap();
        assert_eq!(
            update.objects()[1],
            PcepObject::ExplicitRoute(placeholder_route())
        );
    }

    #[test]
    fn test_remove_flag_deletes_record() {
        let controller = TeController::new();
        controller.handle_report(
            pcc(),
            &StateReportMessage::new(vec![lsp_object(1, false, false)]),
        );
        assert_eq!(controller.lsp_count(), 1);

        let update = controller.handle_report(
            pcc(),
            &StateReportMessage::new(vec![lsp_object(1, false, true)]),
        );
        assert!(update.is_none());
        assert_eq!(controller.lsp_count(), 0);
    }

    #[test]
    fn test_objects_attach_to_preceding_lsp() {
        let controller = TeController::new();
        let report = StateReportMessage::new(vec![
            lsp_object(1, false, false),
            PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 1))),
            lsp_object(2, false, false),
            PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 2))),
            PcepObject::Lspa(LspaObject::new(0, 0, 0, 7, 7, false)),
        ]);
        controller.handle_report(pcc(), &report);

        let db = controller.db.lock().unwrap();
        let first = db.get(&LspKey::new(pcc(), 1)).unwrap();
        assert_eq!(first.explicit_route(), Some(&ero(Ipv4Addr::new(10, 0, 0, 1))));
        assert_eq!(first.attributes(), None);
        let second = db.get(&LspKey::new(pcc(), 2)).unwrap();
        assert_eq!(second.explicit_route(), Some(&ero(Ipv4Addr::new(10, 0, 0, 2))));
        assert_eq!(second.attributes(), Some(&LspaObject::new(0, 0, 0, 7, 7, false)));
    }

    #[test]
    fn test_update_covers_all_delegated_lsps_in_plsp_order() {
        let controller = TeController::new();
        controller.handle_report(
            pcc(),
            &StateReportMessage::new(vec![
                lsp_object(9, true, false),
                PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 9))),
            ]),
        );
        let update = controller
            .handle_report(
                pcc(),
                &StateReportMessage::new(vec![
                    lsp_object(2, true, false),
                    PcepObject::ExplicitRoute(ero(Ipv4Addr::new(10, 0, 0, 2))),
                ]),
            )
            .unwrap();

        let plsp_ids: Vec<u32> = update
            .objects()
            .iter()
            .filter_map(|object| match object {
                PcepObject::Lsp(lsp) => Some(lsp.plsp_id()),
                _ => None,
            })
            .collect();
        assert_eq!(plsp_ids, vec![2, 9]);
    }

    #[test]
    fn test_lsps_are_scoped_per_pcc() {
        let controller = TeController::new();
        let other = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 2));
        controller.handle_report(
            pcc(),
            &StateReportMessage::new(vec![lsp_object(1, true, false)]),
        );

        // The other PCC holds no delegations, its report yields no update
        let update = controller.handle_report(
            other,
            &StateReportMessage::new(vec![lsp_object(1, false, false)]),
        );
        assert!(update.is_none());
        assert_eq!(controller.lsp_count(), 2);

        controller.remove_pcc(pcc());
        assert_eq!(controller.lsp_count(), 1);
        let db = controller.db.lock().unwrap();
        assert!(db.get(&LspKey::new(other, 1)).is_some());
        assert!(db.get(&LspKey::new(pcc(), 1)).is_none());
    }
}
