use byteorder::{BigEndian, WriteBytesExt};

use crate::ofp_header::TlvHeader;
use crate::ofp_list::{marshal_list, parse_list_to_end, size_of_list, ListItem};
use crate::ofp_message::OfpSerializationError;
use crate::ofp_utils::{length_at, write_padding_bytes, OfpReader};

use super::MessageType;

/// Rate in kb/s.
pub const OFPMF_KBPS: u16 = 1 << 0;
/// Rate in packets per second.
pub const OFPMF_PKTPS: u16 = 1 << 1;
pub const OFPMF_BURST: u16 = 1 << 2;
pub const OFPMF_STATS: u16 = 1 << 3;

/// Meter band type codes.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeterBandType {
    Drop = 1,
    DscpRemark = 2,
    Experimenter = 0xffff,
}

impl MeterBandType {
    pub const ALL: [MeterBandType; 3] = [MeterBandType::Drop,
                                         MeterBandType::DscpRemark,
                                         MeterBandType::Experimenter];

    pub fn of_int(code: u16) -> Result<MeterBandType, OfpSerializationError> {
        MeterBandType::ALL
            .iter()
            .find(|t| **t as u16 == code)
            .copied()
            .ok_or(OfpSerializationError::UnsupportedMeterBandType { code })
    }
}

/// A rate threshold of a meter and what happens to packets above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeterBand {
    Drop { rate: u32, burst_size: u32 },
    DscpRemark {
        rate: u32,
        burst_size: u32,
        prec_level: u8,
    },
    Experimenter {
        rate: u32,
        burst_size: u32,
        experimenter: u32,
    },
}

const METER_BAND_LEN: usize = 16;

impl MeterBand {
    pub fn type_code(band: &MeterBand) -> MeterBandType {
        match *band {
            MeterBand::Drop { .. } => MeterBandType::Drop,
            MeterBand::DscpRemark { .. } => MeterBandType::DscpRemark,
            MeterBand::Experimenter { .. } => MeterBandType::Experimenter,
        }
    }

    pub fn default_of(typ: MeterBandType) -> MeterBand {
        match typ {
            MeterBandType::Drop => MeterBand::Drop { rate: 0, burst_size: 0 },
            MeterBandType::DscpRemark => {
                MeterBand::DscpRemark {
                    rate: 0,
                    burst_size: 0,
                    prec_level: 0,
                }
            }
            MeterBandType::Experimenter => {
                MeterBand::Experimenter {
                    rate: 0,
                    burst_size: 0,
                    experimenter: 0,
                }
            }
        }
    }

    fn rate_and_burst(band: &MeterBand) -> (u32, u32) {
        match *band {
            MeterBand::Drop { rate, burst_size } |
            MeterBand::DscpRemark { rate, burst_size, .. } |
            MeterBand::Experimenter { rate, burst_size, .. } => (rate, burst_size),
        }
    }
}

impl ListItem for MeterBand {
    const WHAT: &'static str = "meter band";
    const MIN_LEN: usize = 4;

    fn wire_len(head: &[u8]) -> usize {
        length_at(head, 2)
    }

    fn size_of(_: &MeterBand) -> usize {
        METER_BAND_LEN
    }

    fn parse(bytes: &mut OfpReader) -> Result<Option<MeterBand>, OfpSerializationError> {
        let header = TlvHeader::parse(bytes, Self::WHAT, Self::MIN_LEN)?;
        let typ = MeterBandType::of_int(header.typ)?;
        let rate = bytes.read_u32()?;
        let burst_size = bytes.read_u32()?;
        let band = match typ {
            MeterBandType::Drop => {
                bytes.skip(4)?;
                MeterBand::Drop { rate, burst_size }
            }
            MeterBandType::DscpRemark => {
                let prec_level = bytes.read_u8()?;
                bytes.skip(3)?;
                MeterBand::DscpRemark {
                    rate,
                    burst_size,
                    prec_level,
                }
            }
            MeterBandType::Experimenter => {
                MeterBand::Experimenter {
                    rate,
                    burst_size,
                    experimenter: bytes.read_u32()?,
                }
            }
        };
        Ok(Some(band))
    }

    fn marshal(band: &MeterBand, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        TlvHeader::marshal(bytes,
                           TlvHeader::new(MeterBand::type_code(band) as u16,
                                          METER_BAND_LEN as u16))?;
        let (rate, burst_size) = MeterBand::rate_and_burst(band);
        bytes.write_u32::<BigEndian>(rate)?;
        bytes.write_u32::<BigEndian>(burst_size)?;
        match *band {
            MeterBand::Drop { .. } => write_padding_bytes(bytes, 4)?,
            MeterBand::DscpRemark { prec_level, .. } => {
                bytes.write_u8(prec_level)?;
                write_padding_bytes(bytes, 3)?;
            }
            MeterBand::Experimenter { experimenter, .. } => {
                bytes.write_u32::<BigEndian>(experimenter)?
            }
        }
        Ok(())
    }
}

/// Type of modification to perform on a meter.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MeterModCmd {
    Add = 0,
    Modify = 1,
    Delete = 2,
}

impl MeterModCmd {
    pub fn of_int(cmd: u16) -> Result<MeterModCmd, OfpSerializationError> {
        match cmd {
            0 => Ok(MeterModCmd::Add),
            1 => Ok(MeterModCmd::Modify),
            2 => Ok(MeterModCmd::Delete),
            c => Err(OfpSerializationError::invalid("meter_mod command", c)),
        }
    }
}

/// Represents modifications to the meter table from the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterMod {
    pub command: MeterModCmd,
    /// `OFPMF_*` bits.
    pub flags: u16,
    pub meter_id: u32,
    pub bands: Vec<MeterBand>,
}

impl MessageType for MeterMod {
    fn size_of(mm: &MeterMod) -> usize {
        8 + size_of_list(&mm.bands)
    }

    fn parse(bytes: &mut OfpReader) -> Result<MeterMod, OfpSerializationError> {
        Ok(MeterMod {
            command: MeterModCmd::of_int(bytes.read_u16()?)?,
            flags: bytes.read_u16()?,
            meter_id: bytes.read_u32()?,
            bands: parse_list_to_end(bytes)?,
        })
    }

    fn marshal(mm: &MeterMod, bytes: &mut Vec<u8>) -> Result<(), OfpSerializationError> {
        bytes.write_u16::<BigEndian>(mm.command as u16)?;
        bytes.write_u16::<BigEndian>(mm.flags)?;
        bytes.write_u32::<BigEndian>(mm.meter_id)?;
        marshal_list(&mm.bands, bytes)
    }
}
