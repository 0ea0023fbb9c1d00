//! gNB table
//!
//! What each association told us in NG Setup: its Global RAN Node ID, name
//! and supported TA list. Handover target resolution and the PLMN
//! compatibility check read from here.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use ogs_ngap::ie::{GlobalRanNodeId, PagingDrx, PlmnId, SupportedTaList, Tai};

use crate::context::AssocId;

/// One NG-set-up gNB
#[derive(Debug, Clone, PartialEq)]
pub struct GnbInfo {
    pub assoc_id: AssocId,
    pub global_ran_node_id: GlobalRanNodeId,
    pub name: Option<String>,
    pub supported_ta_list: SupportedTaList,
    pub paging_drx: PagingDrx,
}

impl GnbInfo {
    /// Every PLMN broadcast in any supported TA
    pub fn broadcast_plmns(&self) -> BTreeSet<PlmnId> {
        self.supported_ta_list
            .0
            .iter()
            .flat_map(|ta| ta.broadcast_plmn_list.iter().map(|b| b.plmn_id))
            .collect()
    }

    /// The TAC is supported and broadcast with the TAI's PLMN
    pub fn serves_tai(&self, tai: &Tai) -> bool {
        self.supported_ta_list.0.iter().any(|ta| {
            ta.tac == tai.tac
                && ta
                    .broadcast_plmn_list
                    .iter()
                    .any(|b| b.plmn_id == tai.plmn_id)
        })
    }
}

/// gNBs keyed by association, with a Global RAN Node ID index
#[derive(Debug, Default)]
pub struct GnbTable {
    by_assoc: RwLock<HashMap<AssocId, Arc<GnbInfo>>>,
    by_global_id: RwLock<HashMap<GlobalRanNodeId, AssocId>>,
}

impl GnbTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gNB. A gNB re-running NG Setup on a new association replaces
    /// its old entry, which is returned.
    pub fn add(&self, info: GnbInfo) -> Option<Arc<GnbInfo>> {
        let mut by_assoc = self.by_assoc.write().unwrap_or_else(PoisonError::into_inner);
        let mut by_global_id = self
            .by_global_id
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut replaced = None;
        if let Some(old_assoc) = by_global_id.insert(info.global_ran_node_id, info.assoc_id) {
            if old_assoc != info.assoc_id {
                replaced = by_assoc.remove(&old_assoc);
            }
        }
        if let Some(previous) = by_assoc.insert(info.assoc_id, Arc::new(info.clone())) {
            if previous.global_ran_node_id != info.global_ran_node_id {
                by_global_id.remove(&previous.global_ran_node_id);
            }
            replaced.get_or_insert(previous);
        }

        log::debug!("[{}] gNB added (assoc={})", info.global_ran_node_id, info.assoc_id);
        replaced
    }

    pub fn remove(&self, assoc_id: AssocId) -> Option<Arc<GnbInfo>> {
        let mut by_assoc = self.by_assoc.write().unwrap_or_else(PoisonError::into_inner);
        let mut by_global_id = self
            .by_global_id
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let gnb = by_assoc.remove(&assoc_id)?;
        if by_global_id.get(&gnb.global_ran_node_id) == Some(&assoc_id) {
            by_global_id.remove(&gnb.global_ran_node_id);
        }
        log::debug!("[{}] gNB removed (assoc={})", gnb.global_ran_node_id, assoc_id);
        Some(gnb)
    }

    pub fn find_by_assoc(&self, assoc_id: AssocId) -> Option<Arc<GnbInfo>> {
        self.by_assoc
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&assoc_id)
            .cloned()
    }

    pub fn find_by_global_id(&self, id: &GlobalRanNodeId) -> Option<Arc<GnbInfo>> {
        let assoc_id = *self
            .by_global_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)?;
        self.find_by_assoc(assoc_id)
    }

    pub fn len(&self) -> usize {
        self.by_assoc
            .read()
            .map(|m| m.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
