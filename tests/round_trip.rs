extern crate rust_ofp13;

use rust_ofp13::dump::hex_dump;
use rust_ofp13::openflow0x04::action::{Action, ActionType};
use rust_ofp13::openflow0x04::instruction::{Instruction, InstructionType};
use rust_ofp13::openflow0x04::oxm::{Match, Oxm, OxmField};
use rust_ofp13::openflow0x04::*;
use rust_ofp13::{decode, encode, OfpMessage};

fn round_trip(msg: Message) {
    let buf = encode(42, &msg).unwrap();
    assert_eq!(buf.len(), Message::size_of(&msg));
    assert_eq!(&buf[2..4], &(buf.len() as u16).to_be_bytes());
    match decode(&buf) {
        Ok((header, parsed)) => {
            assert_eq!(header.xid(), 42);
            assert_eq!(parsed, msg, "\n{}", hex_dump(&buf));
        }
        Err(e) => panic!("{} decoding\n{}\nof {:?}", e, hex_dump(&buf), msg),
    }
}

fn flow_mod(actions: Vec<Action>) -> FlowMod {
    FlowMod::add_flow(10,
                      Match::new(vec![Oxm::in_port(1), Oxm::eth_type(0x0800)]),
                      vec![Instruction::ApplyActions(actions)])
}

fn multipart_request(body: MultipartRequestBody) -> Message {
    Message::MultipartRequest(MultipartRequest { flags: 0, body })
}

fn multipart_reply(body: MultipartReplyBody) -> Message {
    Message::MultipartReply(MultipartReply { flags: 0, body })
}

/// A representative message for every message code.
fn sample(code: MsgCode) -> Message {
    match code {
        MsgCode::Hello => Message::Hello(vec![HelloElem::VersionBitmap(vec![1 << 4])]),
        MsgCode::Error => {
            Message::Error(ErrorMsg {
                err_type: OFPET_BAD_REQUEST,
                code: 1,
                data: vec![0x04, 0x12, 0x00, 0x08],
            })
        }
        MsgCode::EchoReq => Message::EchoRequest(vec![]),
        MsgCode::EchoResp => Message::EchoReply(vec![1, 2, 3, 4, 5]),
        MsgCode::Experimenter => {
            Message::Experimenter(ExperimenterMsg {
                experimenter: 0x2320,
                exp_type: 10,
                data: vec![9; 7],
            })
        }
        MsgCode::FeaturesReq => Message::FeaturesReq,
        MsgCode::FeaturesResp => {
            Message::FeaturesReply(SwitchFeatures {
                datapath_id: 1,
                num_buffers: 256,
                num_tables: 254,
                auxiliary_id: 0,
                capabilities: OFPC_FLOW_STATS | OFPC_GROUP_STATS,
                reserved: 0,
            })
        }
        MsgCode::GetConfigReq => Message::GetConfigRequest,
        MsgCode::GetConfigResp => {
            Message::GetConfigReply(SwitchConfig {
                flags: OFPC_FRAG_NORMAL,
                miss_send_len: 128,
            })
        }
        MsgCode::SetConfig => {
            Message::SetConfig(SwitchConfig {
                flags: OFPC_FRAG_DROP,
                miss_send_len: OFPCML_NO_BUFFER,
            })
        }
        MsgCode::PacketIn => {
            Message::PacketIn(PacketIn {
                input_payload: Payload::NotBuffered(vec![0xaa; 60]),
                total_len: 60,
                reason: PacketInReason::NoMatch,
                table_id: 0,
                cookie: u64::MAX,
                pattern: Match::new(vec![Oxm::in_port(7)]),
            })
        }
        MsgCode::FlowRemoved => {
            Message::FlowRemoved(FlowRemoved {
                cookie: 3,
                priority: 100,
                reason: FlowRemovedReason::IdleTimeout,
                table_id: 1,
                duration_sec: 5,
                duration_nsec: 6,
                idle_timeout: Timeout::ExpiresAfter(5),
                hard_timeout: Timeout::Permanent,
                packet_count: 7,
                byte_count: 8,
                pattern: Match::match_all(),
            })
        }
        MsgCode::PortStatus => {
            Message::PortStatus(PortStatus {
                reason: PortReason::PortAdd,
                desc: PortDesc {
                    port_no: 1,
                    name: "eth0".to_string(),
                    ..PortDesc::default()
                },
            })
        }
        MsgCode::PacketOut => {
            Message::PacketOut(PacketOut {
                output_payload: Payload::NotBuffered(vec![1, 2, 3]),
                in_port: Some(PseudoPort::Controller),
                actions: vec![Action::output(PseudoPort::Flood, 0)],
            })
        }
        MsgCode::FlowMod => {
            Message::FlowMod(flow_mod(vec![Action::output(PseudoPort::Controller,
                                                          OFPCML_NO_BUFFER)]))
        }
        MsgCode::GroupMod => {
            Message::GroupMod(GroupMod {
                command: GroupModCmd::Add,
                group_type: GroupType::Select,
                group_id: 1,
                buckets: vec![Bucket::new(2, vec![Action::output(PseudoPort::PhysicalPort(1), 0)]),
                              Bucket::new(1, vec![])],
            })
        }
        MsgCode::PortMod => {
            Message::PortMod(PortMod {
                port_no: 2,
                hw_addr: [0, 1, 2, 3, 4, 5],
                config: OFPPC_NO_FWD,
                mask: OFPPC_NO_FWD,
                advertise: 0,
            })
        }
        MsgCode::TableMod => {
            Message::TableMod(TableMod {
                table_id: OFPTT_ALL,
                config: 0,
            })
        }
        MsgCode::MultipartReq => {
            multipart_request(MultipartRequestBody::Aggregate(FlowStatsRequest {
                table_id: OFPTT_ALL,
                out_port: OFPP_ANY,
                out_group: OFPG_ANY,
                cookie: 0,
                cookie_mask: 0,
                pattern: Match::match_all(),
            }))
        }
        MsgCode::MultipartResp => multipart_reply(MultipartReplyBody::Desc(SwitchDesc::default())),
        MsgCode::BarrierReq => Message::BarrierRequest,
        MsgCode::BarrierResp => Message::BarrierReply,
        MsgCode::QueueGetConfigReq => {
            Message::QueueGetConfigRequest(QueueGetConfigRequest { port: OFPP_ANY })
        }
        MsgCode::QueueGetConfigResp => {
            Message::QueueGetConfigReply(QueueGetConfigReply {
                port: 1,
                queues: vec![PacketQueue {
                                 queue_id: 1,
                                 port: 1,
                                 properties: vec![QueueProp::MaxRate(1000)],
                             }],
            })
        }
        MsgCode::RoleReq => {
            Message::RoleRequest(RoleMsg {
                role: ControllerRole::Master,
                generation_id: 17,
            })
        }
        MsgCode::RoleResp => {
            Message::RoleReply(RoleMsg {
                role: ControllerRole::Slave,
                generation_id: 18,
            })
        }
        MsgCode::GetAsyncReq => Message::GetAsyncRequest,
        MsgCode::GetAsyncResp => {
            Message::GetAsyncReply(AsyncConfig {
                packet_in_mask: [0x3, 0x0],
                port_status_mask: [0x7, 0x7],
                flow_removed_mask: [0xf, 0x0],
            })
        }
        MsgCode::SetAsync => Message::SetAsync(AsyncConfig::default()),
        MsgCode::MeterMod => {
            Message::MeterMod(MeterMod {
                command: MeterModCmd::Add,
                flags: OFPMF_KBPS,
                meter_id: 1,
                bands: vec![MeterBand::Drop {
                                rate: 1000,
                                burst_size: 0,
                            }],
            })
        }
    }
}

#[test]
fn test_every_message_code() {
    for code in MsgCode::ALL.iter() {
        let msg = sample(*code);
        assert_eq!(Message::msg_code_of_message(&msg), *code);
        round_trip(msg);
    }
}

#[test]
fn test_every_action_type() {
    let actions = ActionType::ALL.iter().map(|t| Action::default_of(*t)).collect::<Vec<_>>();
    for (a, t) in actions.iter().zip(ActionType::ALL.iter()) {
        assert_eq!(Action::type_code(a), *t);
    }
    round_trip(Message::FlowMod(flow_mod(actions)));
}

#[test]
fn test_every_instruction_type() {
    let mut fm = flow_mod(vec![]);
    fm.instructions = InstructionType::ALL.iter().map(|t| Instruction::default_of(*t)).collect();
    round_trip(Message::FlowMod(fm));
}

#[test]
fn test_every_oxm_field() {
    let plain = OxmField::ALL
        .iter()
        .map(|f| Oxm::new(*f, &vec![0x01; f.value_len()]))
        .collect::<Vec<_>>();
    let masked = OxmField::ALL
        .iter()
        .map(|f| Oxm::masked(*f, &vec![0x01; f.value_len()], &vec![0xff; f.value_len()]))
        .collect::<Vec<_>>();
    for oxm_list in vec![plain, masked] {
        let mut fm = flow_mod(vec![]);
        fm.pattern = Match::new(oxm_list);
        round_trip(Message::FlowMod(fm));
    }
}

#[test]
fn test_set_field_of_every_oxm_field() {
    let actions = OxmField::ALL
        .iter()
        .map(|f| Action::SetField(Oxm::new(*f, &vec![0x02; f.value_len()])))
        .collect::<Vec<_>>();
    round_trip(Message::PacketOut(PacketOut {
        output_payload: Payload::Buffered(7, vec![]),
        in_port: None,
        actions,
    }));
}

#[test]
fn test_every_meter_band_type() {
    round_trip(Message::MeterMod(MeterMod {
        command: MeterModCmd::Modify,
        flags: OFPMF_PKTPS | OFPMF_BURST,
        meter_id: 2,
        bands: MeterBandType::ALL.iter().map(|t| MeterBand::default_of(*t)).collect(),
    }));
}

#[test]
fn test_every_queue_property_type() {
    round_trip(Message::QueueGetConfigReply(QueueGetConfigReply {
        port: 3,
        queues: vec![PacketQueue {
                         queue_id: 9,
                         port: 3,
                         properties: QueuePropType::ALL.iter().map(|t| QueueProp::default_of(*t)).collect(),
                     }],
    }));
}

#[test]
fn test_every_table_feature_property_type() {
    let properties = TableFeaturePropType::ALL
        .iter()
        .map(|t| TableFeatureProp::default_of(*t))
        .collect::<Vec<_>>();
    let tf = TableFeatures {
        table_id: 0,
        name: "table0".to_string(),
        metadata_match: u64::MAX,
        metadata_write: u64::MAX,
        config: 0,
        max_entries: 1024,
        properties,
    };
    round_trip(multipart_request(MultipartRequestBody::TableFeatures(vec![tf.clone()])));
    round_trip(multipart_reply(MultipartReplyBody::TableFeatures(vec![tf])));
}

#[test]
fn test_table_feature_ids() {
    let tf = TableFeatures {
        table_id: 1,
        name: "acl".to_string(),
        max_entries: 16,
        properties: vec![TableFeatureProp::Instructions(vec![FeatureId::new(InstructionType::GotoTable as u16),
                                                             FeatureId::new(InstructionType::ApplyActions as u16)]),
                         TableFeatureProp::ApplyActions(vec![FeatureId::new(ActionType::Output as u16),
                                                             FeatureId::new(ActionType::SetField as u16)]),
                         TableFeatureProp::NextTables(vec![2, 3, 4]),
                         TableFeatureProp::Match(vec![Oxm::in_port(0).header(),
                                                      Oxm::eth_type(0).header()])],
        ..TableFeatures::default()
    };
    round_trip(multipart_reply(MultipartReplyBody::TableFeatures(vec![tf])));
}

#[test]
fn test_every_multipart_type() {
    let flow_stats = FlowStats {
        table_id: 0,
        duration_sec: 1,
        duration_nsec: 2,
        priority: 3,
        idle_timeout: Timeout::Permanent,
        hard_timeout: Timeout::ExpiresAfter(60),
        flags: FlowModFlags {
            send_flow_rem: true,
            ..FlowModFlags::default()
        },
        cookie: 4,
        packet_count: 5,
        byte_count: 6,
        pattern: Match::new(vec![Oxm::tcp_dst(80)]),
        instructions: vec![Instruction::Meter(1), Instruction::GotoTable(1)],
    };
    for typ in MultipartType::ALL.iter() {
        let (req, rep) = match *typ {
            MultipartType::Desc => {
                (MultipartRequestBody::Desc, MultipartReplyBody::Desc(SwitchDesc::default()))
            }
            MultipartType::Flow => {
                (MultipartRequestBody::Flow(FlowStatsRequest {
                     table_id: 0,
                     out_port: OFPP_ANY,
                     out_group: OFPG_ANY,
                     cookie: 4,
                     cookie_mask: u64::MAX,
                     pattern: Match::match_all(),
                 }),
                 MultipartReplyBody::Flow(vec![flow_stats.clone()]))
            }
            MultipartType::Aggregate => {
                (MultipartRequestBody::Aggregate(FlowStatsRequest {
                     table_id: OFPTT_ALL,
                     out_port: OFPP_ANY,
                     out_group: OFPG_ANY,
                     cookie: 0,
                     cookie_mask: 0,
                     pattern: Match::match_all(),
                 }),
                 MultipartReplyBody::Aggregate(AggregateStats::default()))
            }
            MultipartType::Table => {
                (MultipartRequestBody::Table,
                 MultipartReplyBody::Table(vec![TableStats::default()]))
            }
            MultipartType::PortStats => {
                (MultipartRequestBody::PortStats(OFPP_ANY),
                 MultipartReplyBody::PortStats(vec![PortStats::default()]))
            }
            MultipartType::Queue => {
                (MultipartRequestBody::Queue {
                     port_no: OFPP_ANY,
                     queue_id: 0xffffffff,
                 },
                 MultipartReplyBody::Queue(vec![QueueStats::default()]))
            }
            MultipartType::Group => {
                (MultipartRequestBody::Group(OFPG_ALL),
                 MultipartReplyBody::Group(vec![GroupStats::default()]))
            }
            MultipartType::GroupDesc => {
                (MultipartRequestBody::GroupDesc,
                 MultipartReplyBody::GroupDesc(vec![GroupDesc {
                                                        group_type: GroupType::Indirect,
                                                        group_id: 3,
                                                        buckets: vec![Bucket::new(0, vec![Action::Group(4)])],
                                                    }]))
            }
            MultipartType::GroupFeatures => {
                (MultipartRequestBody::GroupFeatures,
                 MultipartReplyBody::GroupFeatures(GroupFeatures::default()))
            }
            MultipartType::Meter => {
                (MultipartRequestBody::Meter(1),
                 MultipartReplyBody::Meter(vec![MeterStats::default()]))
            }
            MultipartType::MeterConfig => {
                (MultipartRequestBody::MeterConfig(1),
                 MultipartReplyBody::MeterConfig(vec![MeterBand::DscpRemark {
                                                          rate: 1,
                                                          burst_size: 2,
                                                          prec_level: 1,
                                                      }]))
            }
            MultipartType::MeterFeatures => {
                (MultipartRequestBody::MeterFeatures,
                 MultipartReplyBody::MeterFeatures(MeterFeatures::default()))
            }
            MultipartType::TableFeatures => {
                (MultipartRequestBody::TableFeatures(vec![]),
                 MultipartReplyBody::TableFeatures(vec![TableFeatures::default()]))
            }
            MultipartType::PortDesc => {
                (MultipartRequestBody::PortDesc,
                 MultipartReplyBody::PortDesc(vec![PortDesc::default(), PortDesc::default()]))
            }
            MultipartType::Experimenter => {
                let exp = MultipartExperimenter {
                    experimenter: 0x2320,
                    exp_type: 0,
                    data: vec![1, 2, 3],
                };
                (MultipartRequestBody::Experimenter(exp.clone()),
                 MultipartReplyBody::Experimenter(exp))
            }
        };
        assert_eq!(MultipartRequestBody::type_code(&req), *typ);
        assert_eq!(MultipartReplyBody::type_code(&rep), *typ);
        round_trip(multipart_request(req));
        round_trip(multipart_reply(rep));
    }
}
