//! UE NGAP Context Registry
//!
//! Every UE known to this AMF is reachable by two independent keys: the
//! gNB-assigned RAN-UE-NGAP-ID (scoped by the association it arrived on) and
//! the AMF-UE-NGAP-ID this AMF hands out. The registry owns both indices and
//! is the only place contexts are constructed, so the indices and the identity
//! recorded in each context cannot drift apart.
//!
//! Locking: each index has its own `RwLock`. A context's mutable state sits
//! behind a per-context `Mutex` that handlers hold for one logical step. Lock
//! order is context, then RAN index, then AMF index, then identity. Registry
//! operations never take a context mutex while holding an index.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use ogs_asn1c::ngap::{AmfUeNgapId, PduSessionId};
use ogs_ngap::ie::{
    DrbStatusItem, SNssai, SecurityContext, UeAmbr, UeRadioCapability, UeSecurityCapabilities,
    UserLocationInformation,
};

use crate::error::{RegistryError, UeKey};
use crate::handover::{HandoverPhase, HandoverSession};

/// Transport association identifier (one per gNB link)
pub type AssocId = u64;

/// RAN-side key: RAN-UE-NGAP-IDs are only unique within one gNB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RanKey {
    pub assoc_id: AssocId,
    pub ran_ue_ngap_id: u32,
}

impl RanKey {
    pub fn new(assoc_id: AssocId, ran_ue_ngap_id: u32) -> Self {
        Self {
            assoc_id,
            ran_ue_ngap_id,
        }
    }
}

impl From<RanKey> for UeKey {
    fn from(key: RanKey) -> Self {
        UeKey::RanUeNgapId {
            assoc_id: key.assoc_id,
            ran_ue_ngap_id: key.ran_ue_ngap_id,
        }
    }
}

// ============================================================================
// Per-UE state
// ============================================================================

/// Lifecycle of one PDU session as seen from NGAP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduSessionState {
    SetupRequested,
    Active,
    ReleaseRequested,
}

impl PduSessionState {
    pub fn name(&self) -> &'static str {
        match self {
            PduSessionState::SetupRequested => "SETUP_REQUESTED",
            PduSessionState::Active => "ACTIVE",
            PduSessionState::ReleaseRequested => "RELEASE_REQUESTED",
        }
    }
}

/// PDU session descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PduSession {
    pub pdu_session_id: PduSessionId,
    pub s_nssai: SNssai,
    pub state: PduSessionState,
    /// PDUSessionResourceSetupRequestTransfer as sent to the gNB
    pub setup_request_transfer: Vec<u8>,
    /// Last transfer the gNB returned (setup, modify or handover)
    pub response_transfer: Option<Vec<u8>>,
}

impl PduSession {
    pub fn new(pdu_session_id: PduSessionId, s_nssai: SNssai, setup_request_transfer: Vec<u8>) -> Self {
        Self {
            pdu_session_id,
            s_nssai,
            state: PduSessionState::SetupRequested,
            setup_request_transfer,
            response_transfer: None,
        }
    }
}

/// Mutable state of one UE, guarded by its handle's mutex
#[derive(Debug, Clone)]
pub struct UeNgapContext {
    /// Ordered by PDU session id
    pub sessions: BTreeMap<u8, PduSession>,
    pub(crate) handover_phase: HandoverPhase,
    pub handover: Option<HandoverSession>,
    pub drb_status: Vec<DrbStatusItem>,
    pub user_location: Option<UserLocationInformation>,
    /// Encoded Initial UE Message, replayed by Reroute NAS Request
    pub initial_ue_message: Option<Bytes>,
    pub ue_security_capabilities: Option<UeSecurityCapabilities>,
    pub security_context: Option<SecurityContext>,
    pub ue_ambr: Option<UeAmbr>,
    /// Last UERadioCapability the gNB reported
    pub ue_radio_capability: Option<UeRadioCapability>,
}

impl Default for UeNgapContext {
    fn default() -> Self {
        Self::new()
    }
}

impl UeNgapContext {
    fn new() -> Self {
        Self {
            sessions: BTreeMap::new(),
            handover_phase: HandoverPhase::Idle,
            handover: None,
            drb_status: Vec::new(),
            user_location: None,
            initial_ue_message: None,
            ue_security_capabilities: None,
            security_context: None,
            ue_ambr: None,
            ue_radio_capability: None,
        }
    }

    pub fn handover_phase(&self) -> HandoverPhase {
        self.handover_phase
    }

    pub fn session_ids(&self) -> Vec<PduSessionId> {
        self.sessions.values().map(|s| s.pdu_session_id).collect()
    }
}

/// Identity of a context; written only by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UeIdentity {
    pub ran_key: RanKey,
    pub amf_ue_ngap_id: Option<u64>,
    /// False once the RAN index entry has been removed
    pub ran_indexed: bool,
}

impl UeIdentity {
    pub fn assoc_id(&self) -> AssocId {
        self.ran_key.assoc_id
    }

    pub fn ran_ue_ngap_id(&self) -> u32 {
        self.ran_key.ran_ue_ngap_id
    }
}

/// Shared handle to one UE context
#[derive(Debug)]
pub struct UeHandle {
    identity: RwLock<UeIdentity>,
    state: Mutex<UeNgapContext>,
}

impl UeHandle {
    fn new(ran_key: RanKey) -> Self {
        Self {
            identity: RwLock::new(UeIdentity {
                ran_key,
                amf_ue_ngap_id: None,
                ran_indexed: true,
            }),
            state: Mutex::new(UeNgapContext::new()),
        }
    }

    pub fn identity(&self) -> UeIdentity {
        *read(&self.identity)
    }

    pub fn ran_key(&self) -> RanKey {
        self.identity().ran_key
    }

    pub fn amf_ue_ngap_id(&self) -> Option<u64> {
        self.identity().amf_ue_ngap_id
    }

    /// Lock the context for one logical step
    pub fn lock(&self) -> MutexGuard<'_, UeNgapContext> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consistent copy of the mutable state
    pub fn snapshot(&self) -> UeNgapContext {
        self.lock().clone()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Registry
// ============================================================================

/// Dual-keyed store of UE contexts
#[derive(Debug)]
pub struct UeRegistry {
    /// AMF UE NGAP ID generator
    amf_ue_ngap_id_generator: AtomicU64,
    ran_index: RwLock<HashMap<RanKey, Arc<UeHandle>>>,
    amf_index: RwLock<HashMap<u64, Arc<UeHandle>>>,
}

impl Default for UeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UeRegistry {
    pub fn new() -> Self {
        Self {
            amf_ue_ngap_id_generator: AtomicU64::new(1),
            ran_index: RwLock::new(HashMap::new()),
            amf_index: RwLock::new(HashMap::new()),
        }
    }

    /// Create a context for a previously unseen RAN id and index it.
    ///
    /// A context already registered under the same key is evicted from both
    /// indices; a gNB reusing a RAN id has forgotten the old UE.
    pub fn create(&self, key: RanKey) -> Arc<UeHandle> {
        let ue = Arc::new(UeHandle::new(key));
        let mut ran_index = write(&self.ran_index);
        let mut amf_index = write(&self.amf_index);
        if let Some(old) = ran_index.insert(key, Arc::clone(&ue)) {
            write(&old.identity).ran_indexed = false;
            Self::evict(&mut amf_index, &old);
            log::warn!(
                "RAN UE (assoc={}, ran_ue_ngap_id={}) replaced by a new context",
                key.assoc_id,
                key.ran_ue_ngap_id
            );
        }
        log::debug!(
            "UE context added (assoc={}, ran_ue_ngap_id={})",
            key.assoc_id,
            key.ran_ue_ngap_id
        );
        ue
    }

    /// Register (or overwrite) the RAN index entry for `key`.
    ///
    /// The context's identity follows the key so that both indices keep
    /// agreeing. Returns the context previously registered under `key`, which
    /// is evicted from the AMF index as well.
    pub fn insert_by_ran_id(&self, key: RanKey, ue: &Arc<UeHandle>) -> Option<Arc<UeHandle>> {
        let mut ran_index = write(&self.ran_index);
        let mut amf_index = write(&self.amf_index);
        Self::bind_ran(&mut ran_index, &mut amf_index, key, ue)
    }

    /// Register the AMF index entry for `amf_ue_ngap_id`
    pub fn insert_by_amf_id(
        &self,
        amf_ue_ngap_id: u64,
        ue: &Arc<UeHandle>,
    ) -> Result<(), RegistryError> {
        let mut amf_index = write(&self.amf_index);
        Self::bind_amf(&mut amf_index, amf_ue_ngap_id, ue)
    }

    /// Allocate a fresh AMF-UE-NGAP-ID for `ue` and index it
    pub fn assign_amf_ue_ngap_id(&self, ue: &Arc<UeHandle>) -> Result<u64, RegistryError> {
        let mut amf_index = write(&self.amf_index);
        if let Some(current) = ue.amf_ue_ngap_id() {
            return Err(RegistryError::AlreadyAssigned {
                current,
                requested: current,
            });
        }
        loop {
            let id = self.next_amf_ue_ngap_id();
            if amf_index.contains_key(&id) {
                continue;
            }
            Self::bind_amf(&mut amf_index, id, ue)?;
            log::debug!(
                "AMF-UE-NGAP-ID assigned (ran_ue_ngap_id={}, amf_ue_ngap_id={})",
                ue.ran_key().ran_ue_ngap_id,
                id
            );
            return Ok(id);
        }
    }

    /// Next id from the 40-bit space, wrapping back to 1
    fn next_amf_ue_ngap_id(&self) -> u64 {
        let raw = self.amf_ue_ngap_id_generator.fetch_add(1, Ordering::SeqCst);
        (raw - 1) % AmfUeNgapId::MAX + 1
    }

    pub fn lookup_by_ran_id(&self, key: RanKey) -> Option<Arc<UeHandle>> {
        read(&self.ran_index).get(&key).cloned()
    }

    pub fn lookup_by_amf_id(&self, amf_ue_ngap_id: u64) -> Option<Arc<UeHandle>> {
        read(&self.amf_index).get(&amf_ue_ngap_id).cloned()
    }

    /// Remove the RAN index entry only
    pub fn remove_by_ran_id(&self, key: RanKey) -> Option<Arc<UeHandle>> {
        let mut ran_index = write(&self.ran_index);
        let ue = ran_index.remove(&key)?;
        write(&ue.identity).ran_indexed = false;
        Some(ue)
    }

    /// Remove the AMF index entry only; the context keeps its assigned id
    pub fn remove_by_amf_id(&self, amf_ue_ngap_id: u64) -> Option<Arc<UeHandle>> {
        write(&self.amf_index).remove(&amf_ue_ngap_id)
    }

    /// Move `ue` to a new RAN key (handover completion)
    pub fn rebind_ran(&self, ue: &Arc<UeHandle>, key: RanKey) -> Result<(), RegistryError> {
        let mut ran_index = write(&self.ran_index);
        let mut amf_index = write(&self.amf_index);
        let old = ue.ran_key();
        let indexed = ran_index
            .get(&old)
            .map(|current| Arc::ptr_eq(current, ue))
            .unwrap_or(false);
        if !indexed {
            return Err(RegistryError::NotFound(old.into()));
        }
        if let Some(displaced) = Self::bind_ran(&mut ran_index, &mut amf_index, key, ue) {
            log::warn!(
                "RAN UE (assoc={}, ran_ue_ngap_id={}) displaced by rebind",
                key.assoc_id,
                displaced.ran_key().ran_ue_ngap_id
            );
        }
        log::debug!(
            "UE context rebound (assoc={} -> {}, ran_ue_ngap_id={} -> {})",
            old.assoc_id,
            key.assoc_id,
            old.ran_ue_ngap_id,
            key.ran_ue_ngap_id
        );
        Ok(())
    }

    /// Remove `ue` from both indices
    pub fn destroy(&self, ue: &Arc<UeHandle>) {
        let mut ran_index = write(&self.ran_index);
        let mut amf_index = write(&self.amf_index);
        let identity = ue.identity();
        if ran_index
            .get(&identity.ran_key)
            .is_some_and(|current| Arc::ptr_eq(current, ue))
        {
            ran_index.remove(&identity.ran_key);
        }
        write(&ue.identity).ran_indexed = false;
        Self::evict(&mut amf_index, ue);
        log::debug!(
            "UE context removed (assoc={}, ran_ue_ngap_id={}, amf_ue_ngap_id={:?})",
            identity.ran_key.assoc_id,
            identity.ran_key.ran_ue_ngap_id,
            identity.amf_ue_ngap_id
        );
    }

    /// Every context currently owned by `assoc_id`, through either index
    pub fn list_by_association(&self, assoc_id: AssocId) -> Vec<Arc<UeHandle>> {
        let ran_index = read(&self.ran_index);
        let amf_index = read(&self.amf_index);
        let mut found: Vec<Arc<UeHandle>> = ran_index
            .iter()
            .filter(|(key, _)| key.assoc_id == assoc_id)
            .map(|(_, ue)| Arc::clone(ue))
            .collect();
        for ue in amf_index.values() {
            if ue.ran_key().assoc_id == assoc_id && !found.iter().any(|f| Arc::ptr_eq(f, ue)) {
                found.push(Arc::clone(ue));
            }
        }
        found
    }

    /// Contexts with an in-flight handover toward `assoc_id`
    pub fn list_by_handover_target(&self, assoc_id: AssocId) -> Vec<Arc<UeHandle>> {
        let all: Vec<Arc<UeHandle>> = read(&self.amf_index).values().cloned().collect();
        all.into_iter()
            .filter(|ue| {
                ue.lock()
                    .handover
                    .as_ref()
                    .is_some_and(|ho| ho.target_assoc == assoc_id)
            })
            .collect()
    }

    /// Number of contexts reachable by either index
    pub fn len(&self) -> usize {
        let ran_index = read(&self.ran_index);
        let amf_index = read(&self.amf_index);
        let unindexed_by_ran = amf_index
            .values()
            .filter(|ue| {
                !ran_index
                    .get(&ue.ran_key())
                    .is_some_and(|current| Arc::ptr_eq(current, ue))
            })
            .count();
        ran_index.len() + unindexed_by_ran
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bind_ran(
        ran_index: &mut HashMap<RanKey, Arc<UeHandle>>,
        amf_index: &mut HashMap<u64, Arc<UeHandle>>,
        key: RanKey,
        ue: &Arc<UeHandle>,
    ) -> Option<Arc<UeHandle>> {
        let old_key = ue.ran_key();
        if old_key != key
            && ran_index
                .get(&old_key)
                .is_some_and(|current| Arc::ptr_eq(current, ue))
        {
            ran_index.remove(&old_key);
        }
        {
            let mut identity = write(&ue.identity);
            identity.ran_key = key;
            identity.ran_indexed = true;
        }
        let displaced = ran_index
            .insert(key, Arc::clone(ue))
            .filter(|old| !Arc::ptr_eq(old, ue))?;
        write(&displaced.identity).ran_indexed = false;
        Self::evict(amf_index, &displaced);
        Some(displaced)
    }

    fn bind_amf(
        amf_index: &mut HashMap<u64, Arc<UeHandle>>,
        amf_ue_ngap_id: u64,
        ue: &Arc<UeHandle>,
    ) -> Result<(), RegistryError> {
        if let Some(current) = amf_index.get(&amf_ue_ngap_id) {
            if !Arc::ptr_eq(current, ue) {
                return Err(RegistryError::DuplicateAssignment(amf_ue_ngap_id));
            }
        }
        let mut identity = write(&ue.identity);
        match identity.amf_ue_ngap_id {
            Some(current) if current != amf_ue_ngap_id => {
                return Err(RegistryError::AlreadyAssigned {
                    current,
                    requested: amf_ue_ngap_id,
                })
            }
            _ => identity.amf_ue_ngap_id = Some(amf_ue_ngap_id),
        }
        amf_index.insert(amf_ue_ngap_id, Arc::clone(ue));
        Ok(())
    }

    fn evict(amf_index: &mut HashMap<u64, Arc<UeHandle>>, ue: &Arc<UeHandle>) {
        if let Some(id) = ue.amf_ue_ngap_id() {
            if amf_index
                .get(&id)
                .is_some_and(|current| Arc::ptr_eq(current, ue))
            {
                amf_index.remove(&id);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
