//! AMF NGAP core
//!
//! `Amf` owns the UE registry and the gNB table and is shared between
//! workers via `Arc`. Inbound messages enter through `on_inbound_message`
//! and `handle`; the NAS and session layers drive AMF-initiated procedures
//! through the methods in the second half of this file.

use std::sync::Arc;

use ogs_asn1c::ngap::{Cause, CauseMisc, NasPdu, PduSessionId};
use ogs_ngap::ie::nas::{decode_tlv, UeSecurityCapability};
use ogs_ngap::ie::{
    AllowedNssai, AmfSetId, PduSessionModifyItem, PduSessionSetupItem, ResetType,
    SecurityContext, SecurityKey, TransparentContainer, UeAmbr,
};
use ogs_ngap::msg::{
    PduSessionResourceModifyRequest, PduSessionResourceSetupRequest, RerouteNasRequest,
};
use ogs_ngap::{decode_ngap_message, NgapError, NgapResult};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::{AmfConfig, AmfProfile, ConfigError};
use crate::context::{AssocId, PduSession, PduSessionState, RanKey, UeHandle, UeRegistry};
use crate::error::{AmfError, AmfResult, RegistryError, UeKey};
use crate::event::{AmfIndication, DecodedMessage, HandoverStep, OutboundMessage};
use crate::gnb::GnbTable;
use crate::handover;
use crate::ngap_build::*;
use crate::ngap_handler::{self, drop_ue};

/// The NGAP core of one AMF instance
#[derive(Debug)]
pub struct Amf {
    pub(crate) profile: AmfProfile,
    pub(crate) registry: UeRegistry,
    pub(crate) gnbs: GnbTable,
    indications: Option<UnboundedSender<AmfIndication>>,
}

impl Amf {
    pub fn new(profile: AmfProfile) -> Self {
        Self {
            profile,
            registry: UeRegistry::new(),
            gnbs: GnbTable::new(),
            indications: None,
        }
    }

    /// An AMF whose indications go to `tx`
    pub fn with_indications(profile: AmfProfile, tx: UnboundedSender<AmfIndication>) -> Self {
        Self {
            indications: Some(tx),
            ..Self::new(profile)
        }
    }

    pub fn from_config(config: &AmfConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.resolve()?))
    }

    pub fn profile(&self) -> &AmfProfile {
        &self.profile
    }

    pub fn registry(&self) -> &UeRegistry {
        &self.registry
    }

    pub fn gnbs(&self) -> &GnbTable {
        &self.gnbs
    }

    pub(crate) fn indicate(&self, indication: AmfIndication) {
        match &self.indications {
            Some(tx) => {
                if tx.send(indication).is_err() {
                    log::debug!("Indication receiver gone");
                }
            }
            None => log::trace!("No indication receiver, dropped {}", indication.name()),
        }
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Decode one NGAP PDU received on `assoc_id`
    pub fn on_inbound_message(&self, assoc_id: AssocId, raw: bytes::Bytes) -> NgapResult<DecodedMessage> {
        match decode_ngap_message(&raw) {
            Ok(message) => Ok(DecodedMessage {
                assoc_id,
                message,
                raw,
            }),
            Err(e) => {
                log::warn!("[assoc={}] NGAP decode failed: {}", assoc_id, e);
                Err(e)
            }
        }
    }

    /// Run the handler for a decoded message. Messages that arrive in the
    /// wrong handover state are logged and dropped.
    pub fn handle(&self, decoded: &DecodedMessage) -> AmfResult<Vec<OutboundMessage>> {
        match ngap_handler::dispatch(self, decoded) {
            Err(AmfError::InvalidTransition { state, event }) => {
                log::warn!(
                    "[assoc={}] {} ignored in {} ({})",
                    decoded.assoc_id,
                    decoded.message.name(),
                    state,
                    event
                );
                Ok(Vec::new())
            }
            result => result,
        }
    }

    /// A handover guard timer fired
    pub fn handle_timeout(&self, amf_ue_ngap_id: u64, step: HandoverStep) -> Vec<OutboundMessage> {
        handover::handle_timeout(self, amf_ue_ngap_id, step).unwrap_or_else(|e| {
            log::error!(
                "{} handling failed (amf_ue_ngap_id={}): {}",
                step.name(),
                amf_ue_ngap_id,
                e
            );
            Vec::new()
        })
    }

    /// The association went down: forget the gNB, fail handovers toward it
    /// and drop every context it owned
    pub fn on_association_lost(&self, assoc_id: AssocId) -> Vec<OutboundMessage> {
        if let Some(gnb) = self.gnbs.remove(assoc_id) {
            log::info!("[{}] association {} lost", gnb.global_ran_node_id, assoc_id);
        }

        let mut out = Vec::new();
        for ue in self.registry.list_by_handover_target(assoc_id) {
            match handover::abort_for_lost_target(self, &ue, assoc_id) {
                Ok(messages) => out.extend(messages),
                Err(e) => log::error!("Handover abort failed: {}", e),
            }
        }
        let owned = self.registry.list_by_association(assoc_id);
        let count = owned.len();
        for ue in owned {
            out.extend(drop_ue(self, &ue, assoc_id));
        }
        log::info!("[assoc={}] {} UE contexts removed", assoc_id, count);

        out.retain(|m| m.assoc_id != assoc_id);
        out
    }

    // ========================================================================
    // AMF-initiated procedures
    // ========================================================================

    fn ue(&self, amf_ue_ngap_id: u64) -> AmfResult<Arc<UeHandle>> {
        self.registry
            .lookup_by_amf_id(amf_ue_ngap_id)
            .ok_or(AmfError::Registry(RegistryError::NotFound(
                UeKey::AmfUeNgapId(amf_ue_ngap_id),
            )))
    }

    pub fn downlink_nas_transport(
        &self,
        amf_ue_ngap_id: u64,
        nas_pdu: NasPdu,
    ) -> AmfResult<OutboundMessage> {
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let ctx = ue.lock();
        Ok(OutboundMessage::new(
            key.assoc_id,
            build_downlink_nas_transport(amf_ue_ngap_id, key.ran_ue_ngap_id, &ctx, nas_pdu),
        ))
    }

    /// Record the sessions and ask the serving gNB to set them up
    pub fn setup_pdu_sessions(
        &self,
        amf_ue_ngap_id: u64,
        nas_pdu: Option<NasPdu>,
        items: Vec<PduSessionSetupItem>,
    ) -> AmfResult<OutboundMessage> {
        if items.is_empty() {
            return Err(NgapError::InvalidIeValue {
                ie_name: "PDUSessionResourceSetupListSUReq",
                reason: "no sessions".to_string(),
            }
            .into());
        }
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let mut ctx = ue.lock();
        for item in &items {
            ctx.sessions.insert(
                item.pdu_session_id.0,
                PduSession::new(item.pdu_session_id, item.s_nssai, item.transfer.clone()),
            );
        }
        log::info!(
            "PDU Session Resource Setup Request (amf_ue_ngap_id={}, sessions={:?})",
            amf_ue_ngap_id,
            items.iter().map(|i| i.pdu_session_id.0).collect::<Vec<_>>()
        );
        Ok(OutboundMessage::new(
            key.assoc_id,
            PduSessionResourceSetupRequest {
                amf_ue_ngap_id,
                ran_ue_ngap_id: key.ran_ue_ngap_id,
                nas_pdu,
                setup_list: items.into(),
                ue_ambr: ctx.ue_ambr,
            },
        ))
    }

    /// Establish the UE context on the serving gNB with the KgNB from the NAS
    /// layer. Sessions in `items` are recorded and set up along with it.
    pub fn initial_context_setup(
        &self,
        amf_ue_ngap_id: u64,
        security_key: SecurityKey,
        nas_pdu: Option<NasPdu>,
        items: Vec<PduSessionSetupItem>,
    ) -> AmfResult<OutboundMessage> {
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let mut ctx = ue.lock();
        let request = build_initial_context_setup_request(
            amf_ue_ngap_id,
            key.ran_ue_ngap_id,
            &ctx,
            &self.profile,
            security_key,
            nas_pdu,
            items.clone(),
        )?;
        for item in items {
            ctx.sessions.insert(
                item.pdu_session_id.0,
                PduSession::new(item.pdu_session_id, item.s_nssai, item.transfer),
            );
        }
        log::info!(
            "Initial Context Setup Request (amf_ue_ngap_id={}, sessions={:?})",
            amf_ue_ngap_id,
            request.setup_list.as_ref().map(|l| l.ids()).unwrap_or_default()
        );
        Ok(OutboundMessage::new(key.assoc_id, request))
    }

    /// Modify sessions the UE has; unknown ids are dropped from the request
    pub fn modify_pdu_sessions(
        &self,
        amf_ue_ngap_id: u64,
        items: Vec<PduSessionModifyItem>,
    ) -> AmfResult<OutboundMessage> {
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let ctx = ue.lock();
        let modify_list: Vec<PduSessionModifyItem> = items
            .into_iter()
            .filter(|item| {
                let known = ctx.sessions.contains_key(&item.pdu_session_id.0);
                if !known {
                    log::warn!(
                        "Modify for unknown PDU session {} (amf_ue_ngap_id={})",
                        item.pdu_session_id.0,
                        amf_ue_ngap_id
                    );
                }
                known
            })
            .collect();
        if modify_list.is_empty() {
            return Err(NgapError::InvalidIeValue {
                ie_name: "PDUSessionResourceModifyListModReq",
                reason: "no known sessions".to_string(),
            }
            .into());
        }
        Ok(OutboundMessage::new(
            key.assoc_id,
            PduSessionResourceModifyRequest {
                amf_ue_ngap_id,
                ran_ue_ngap_id: key.ran_ue_ngap_id,
                modify_list: modify_list.into(),
            },
        ))
    }

    pub fn release_pdu_sessions(
        &self,
        amf_ue_ngap_id: u64,
        pdu_session_ids: &[PduSessionId],
        nas_pdu: Option<NasPdu>,
    ) -> AmfResult<OutboundMessage> {
        if pdu_session_ids.is_empty() {
            return Err(NgapError::InvalidIeValue {
                ie_name: "PDUSessionResourceToReleaseListRelCmd",
                reason: "no sessions".to_string(),
            }
            .into());
        }
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let mut ctx = ue.lock();
        for id in pdu_session_ids {
            if let Some(session) = ctx.sessions.get_mut(&id.0) {
                session.state = PduSessionState::ReleaseRequested;
            }
        }
        Ok(OutboundMessage::new(
            key.assoc_id,
            build_pdu_session_resource_release_command(
                amf_ue_ngap_id,
                key.ran_ue_ngap_id,
                pdu_session_ids,
                nas_pdu,
                normal_release(),
            )?,
        ))
    }

    /// The context stays until the gNB answers with Release Complete
    pub fn release_ue_context(&self, amf_ue_ngap_id: u64, cause: Cause) -> AmfResult<OutboundMessage> {
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        log::info!(
            "UE Context Release Command (amf_ue_ngap_id={}, cause={})",
            amf_ue_ngap_id,
            cause
        );
        Ok(OutboundMessage::new(
            key.assoc_id,
            build_ue_context_release_command(amf_ue_ngap_id, Some(key.ran_ue_ngap_id), cause),
        ))
    }

    /// Ask the gNB to send the UE's Initial UE Message to another AMF set
    pub fn reroute_nas_request(
        &self,
        amf_ue_ngap_id: u64,
        amf_set_id: AmfSetId,
        allowed_nssai: Option<AllowedNssai>,
    ) -> AmfResult<OutboundMessage> {
        let ue = self.ue(amf_ue_ngap_id)?;
        let key = ue.ran_key();
        let initial = ue
            .lock()
            .initial_ue_message
            .clone()
            .ok_or(AmfError::NoInitialUeMessage(amf_ue_ngap_id))?;
        Ok(OutboundMessage::new(
            key.assoc_id,
            RerouteNasRequest {
                ran_ue_ngap_id: key.ran_ue_ngap_id,
                amf_ue_ngap_id: Some(amf_ue_ngap_id),
                ngap_message: TransparentContainer(initial.to_vec()),
                amf_set_id,
                allowed_nssai,
            },
        ))
    }

    /// AMF-initiated NG Reset. Affected contexts are dropped locally before
    /// the reset goes out.
    pub fn ng_reset(&self, assoc_id: AssocId, reset_type: ResetType) -> AmfResult<Vec<OutboundMessage>> {
        if self.gnbs.find_by_assoc(assoc_id).is_none() {
            return Err(AmfError::UnknownAssociation(assoc_id));
        }

        let affected: Vec<Arc<UeHandle>> = match &reset_type {
            ResetType::NgInterface => self.registry.list_by_association(assoc_id),
            ResetType::PartOfNgInterface(list) => list
                .0
                .iter()
                .filter_map(|item| {
                    let by_ran = item.ran_ue_ngap_id.and_then(|id| {
                        self.registry.lookup_by_ran_id(RanKey::new(assoc_id, id.0))
                    });
                    by_ran.or_else(|| {
                        item.amf_ue_ngap_id
                            .and_then(|id| self.registry.lookup_by_amf_id(id.0))
                            .filter(|ue| ue.ran_key().assoc_id == assoc_id)
                    })
                })
                .collect(),
        };

        let mut out = Vec::new();
        for ue in &affected {
            out.extend(drop_ue(self, ue, assoc_id));
        }
        log::info!(
            "[assoc={}] NG Reset sent, {} UE contexts dropped",
            assoc_id,
            affected.len()
        );
        out.push(OutboundMessage::new(
            assoc_id,
            build_ng_reset(Cause::Misc(CauseMisc::OmIntervention), reset_type),
        ));
        Ok(out)
    }

    /// Store the UE security capability from its NAS TLV (IEI included)
    pub fn set_ue_security_capability(&self, amf_ue_ngap_id: u64, nas_tlv: &[u8]) -> AmfResult<()> {
        let capability: UeSecurityCapability = decode_tlv(nas_tlv, true)?;
        let ue = self.ue(amf_ue_ngap_id)?;
        ue.lock().ue_security_capabilities = Some(capability.to_ngap());
        Ok(())
    }

    pub fn set_security_context(
        &self,
        amf_ue_ngap_id: u64,
        next_hop_chaining_count: u8,
        next_hop: [u8; 32],
    ) -> AmfResult<()> {
        if next_hop_chaining_count > 7 {
            return Err(NgapError::InvalidIeValue {
                ie_name: "SecurityContext",
                reason: format!("NCC {} out of range", next_hop_chaining_count),
            }
            .into());
        }
        let ue = self.ue(amf_ue_ngap_id)?;
        ue.lock().security_context = Some(SecurityContext {
            next_hop_chaining_count,
            next_hop,
        });
        Ok(())
    }

    pub fn set_ue_ambr(&self, amf_ue_ngap_id: u64, ue_ambr: UeAmbr) -> AmfResult<()> {
        let ue = self.ue(amf_ue_ngap_id)?;
        ue.lock().ue_ambr = Some(ue_ambr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogs_asn1c::ngap::CauseRadioNetwork;
    use ogs_ngap::ie::nas::encode_tlv;
    use ogs_ngap::ie::{
        BroadcastPlmnItem, GlobalRanNodeId, NrCgi, PagingDrx, PlmnId, RrcEstablishmentCause,
        SNssai, SupportedTaItem, SupportedTaList, Tac, Tai, UeNgapIds,
        UserLocationInformation, UserLocationInformationNr,
    };
    use ogs_ngap::msg::{InitialUeMessage, NgSetupRequest};
    use ogs_ngap::NgapMessage;

    fn plmn() -> PlmnId {
        PlmnId::from_mcc_mnc(999, 70, 2)
    }

    fn setup(amf: &Amf, assoc_id: AssocId, gnb_id: u32) {
        let req = NgSetupRequest {
            global_ran_node_id: GlobalRanNodeId::Gnb {
                plmn_id: plmn(),
                gnb_id,
                gnb_id_len: 22,
            },
            ran_node_name: None,
            supported_ta_list: SupportedTaList(vec![SupportedTaItem {
                tac: Tac::from_u32(1),
                broadcast_plmn_list: vec![BroadcastPlmnItem {
                    plmn_id: plmn(),
                    tai_slice_support_list: vec![SNssai::new(1, None)],
                }],
            }]),
            default_paging_drx: PagingDrx::V128,
        };
        let decoded = DecodedMessage::from_message(assoc_id, req.into()).unwrap();
        amf.handle(&decoded).unwrap();
    }

    fn attach(amf: &Amf, assoc_id: AssocId, ran_ue_ngap_id: u32) -> u64 {
        let msg = InitialUeMessage {
            ran_ue_ngap_id,
            nas_pdu: NasPdu(vec![0x7e, 0x00, 0x41]),
            user_location_information: UserLocationInformation::Nr(UserLocationInformationNr {
                nr_cgi: NrCgi {
                    plmn_id: plmn(),
                    cell_id: 0x10,
                },
                tai: Tai {
                    plmn_id: plmn(),
                    tac: Tac::from_u32(1),
                },
                timestamp: None,
            }),
            rrc_establishment_cause: RrcEstablishmentCause::MoSignalling,
            amf_set_id: None,
            ue_context_requested: false,
            allowed_nssai: None,
        };
        let decoded = DecodedMessage::from_message(assoc_id, msg.into()).unwrap();
        amf.handle(&decoded).unwrap();
        amf.registry
            .lookup_by_ran_id(RanKey::new(assoc_id, ran_ue_ngap_id))
            .and_then(|ue| ue.amf_ue_ngap_id())
            .unwrap()
    }

    fn amf() -> Amf {
        Amf::new(AmfConfig::default().resolve().unwrap())
    }

    #[test]
    fn test_release_ue_context_targets_serving_gnb() {
        let amf = amf();
        setup(&amf, 1, 0x100);
        let id = attach(&amf, 1, 42);

        let out = amf
            .release_ue_context(id, Cause::RadioNetwork(CauseRadioNetwork::Unspecified))
            .unwrap();
        assert_eq!(out.assoc_id, 1);
        let NgapMessage::UeContextReleaseCommand(cmd) = &out.message else {
            panic!("unexpected {:?}", out.message);
        };
        assert_eq!(
            cmd.ue_ngap_ids,
            UeNgapIds::Pair {
                amf_ue_ngap_id: ogs_asn1c::ngap::AmfUeNgapId(id),
                ran_ue_ngap_id: ogs_asn1c::ngap::RanUeNgapId(42)
            }
        );
    }

    #[test]
    fn test_reroute_carries_initial_ue_message() {
        let amf = amf();
        setup(&amf, 1, 0x100);
        let id = attach(&amf, 1, 7);

        let out = amf
            .reroute_nas_request(id, AmfSetId::new(3).unwrap(), None)
            .unwrap();
        let NgapMessage::RerouteNasRequest(req) = &out.message else {
            panic!("unexpected {:?}", out.message);
        };
        let inner = decode_ngap_message(&req.ngap_message.0).unwrap();
        assert_eq!(inner.name(), "InitialUeMessage");
        assert_eq!(req.amf_ue_ngap_id, Some(id));
    }

    #[test]
    fn test_security_capability_from_nas() {
        let amf = amf();
        setup(&amf, 1, 0x100);
        let id = attach(&amf, 1, 7);

        let cap = UeSecurityCapability {
            nr_ea: 0xf0,
            nr_ia: 0x70,
            eutra_ea: Some(0xf0),
            eutra_ia: Some(0x70),
        };
        let tlv = encode_tlv(&cap, true).unwrap();
        amf.set_ue_security_capability(id, &tlv).unwrap();

        let stored = amf.ue(id).unwrap().snapshot().ue_security_capabilities;
        assert_eq!(stored, Some(cap.to_ngap()));
    }

    #[test]
    fn test_security_context_ncc_range() {
        let amf = amf();
        setup(&amf, 1, 0x100);
        let id = attach(&amf, 1, 7);

        assert!(amf.set_security_context(id, 8, [0; 32]).is_err());
        amf.set_security_context(id, 2, [0xab; 32]).unwrap();
        assert_eq!(
            amf.ue(id).unwrap().snapshot().security_context.unwrap().next_hop_chaining_count,
            2
        );
    }

    #[test]
    fn test_ng_reset_drops_contexts() {
        let amf = amf();
        setup(&amf, 1, 0x100);
        attach(&amf, 1, 7);
        attach(&amf, 1, 8);

        let out = amf.ng_reset(1, ResetType::NgInterface).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].message.name(), "NgReset");
        assert!(amf.registry.is_empty());
        assert!(amf.ng_reset(9, ResetType::NgInterface).is_err());
    }

    #[test]
    fn test_unknown_ue_operations() {
        let amf = amf();
        assert!(matches!(
            amf.release_ue_context(99, Cause::RadioNetwork(CauseRadioNetwork::Unspecified)),
            Err(AmfError::Registry(RegistryError::NotFound(_)))
        ));
        assert!(amf.set_ue_ambr(99, UeAmbr { dl: 1, ul: 1 }).is_err());
    }
}
