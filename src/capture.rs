use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, trace};
use pcap_file::pcap::PcapReader;
use pcap_file::pcapng::{Block, PcapNgReader};
use pcap_file::DataLink;
use radiotap::Radiotap;

const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// Link layers we can pull 802.11 frames out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkType {
    /// DLT 105, bare 802.11 frames.
    Ieee80211,
    /// DLT 127, 802.11 frames behind a radiotap header.
    Radiotap,
}

impl LinkType {
    pub fn from_datalink(datalink: DataLink) -> Option<Self> {
        match datalink {
            DataLink::IEEE802_11 => Some(LinkType::Ieee80211),
            DataLink::IEEE802_11_RADIOTAP => Some(LinkType::Radiotap),
            _ => None,
        }
    }
}

/// An 802.11 frame read from a capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    pub timestamp: Duration,
    pub data: Vec<u8>,
    /// Channel frequency from the radiotap header.
    pub frequency: Option<u16>,
}

/// Pull the 802.11 frame out of a captured packet.
///
/// Radiotap headers are removed, and so is the FCS when radiotap says one is present.
/// Frames with a bad FCS are dropped.
pub fn extract_frame(link: LinkType, packet: &[u8], timestamp: Duration) -> Option<CapturedFrame> {
    match link {
        LinkType::Ieee80211 => Some(CapturedFrame {
            timestamp,
            data: packet.to_vec(),
            frequency: None,
        }),
        LinkType::Radiotap => {
            let radiotap = match Radiotap::from_bytes(packet) {
                Ok(radiotap) => radiotap,
                Err(error) => {
                    debug!("Couldn't read packet data with Radiotap: {error:?}");
                    return None;
                }
            };
            let payload = packet.get(radiotap.header.length..)?;
            let payload = if radiotap.flags.is_some_and(|flags| flags.fcs) {
                match libwifi::strip_fcs(payload) {
                    Ok(payload) => payload,
                    Err(error) => {
                        trace!("Dropping frame: {error}");
                        return None;
                    }
                }
            } else {
                payload
            };
            Some(CapturedFrame {
                timestamp,
                data: payload.to_vec(),
                frequency: radiotap.channel.map(|channel| channel.freq),
            })
        }
    }
}

enum Source {
    Pcap {
        reader: PcapReader<BufReader<File>>,
        link: LinkType,
    },
    PcapNg {
        reader: PcapNgReader<BufReader<File>>,
        links: HashMap<u32, Option<LinkType>>,
    },
}

/// Reads 802.11 frames from a pcap or pcapng file.
pub struct CaptureReader {
    source: Source,
    pub packets: u64,
    pub skipped: u64,
}

impl CaptureReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Couldn't open {}", path.display()))?;
        let mut buffered = BufReader::new(file);
        let is_pcapng = buffered
            .fill_buf()
            .with_context(|| format!("Couldn't read {}", path.display()))?
            .starts_with(&PCAPNG_MAGIC);

        let source = if is_pcapng {
            let reader = PcapNgReader::new(buffered)
                .with_context(|| format!("{} is not a valid pcapng file", path.display()))?;
            Source::PcapNg {
                reader,
                links: HashMap::new(),
            }
        } else {
            let reader = PcapReader::new(buffered)
                .with_context(|| format!("{} is not a valid pcap file", path.display()))?;
            let datalink = reader.header().datalink;
            let Some(link) = LinkType::from_datalink(datalink) else {
                bail!(
                    "{} has link type {:?}, expected 802.11 or radiotap",
                    path.display(),
                    datalink
                );
            };
            Source::Pcap { reader, link }
        };

        Ok(CaptureReader {
            source,
            packets: 0,
            skipped: 0,
        })
    }

    /// The next 802.11 frame, `None` at the end of the capture.
    pub fn next_frame(&mut self) -> Option<Result<CapturedFrame>> {
        loop {
            let frame = match &mut self.source {
                Source::Pcap { reader, link } => {
                    let packet = match reader.next_packet()? {
                        Ok(packet) => packet,
                        Err(error) => return Some(Err(error).context("Bad pcap packet")),
                    };
                    self.packets += 1;
                    extract_frame(*link, &packet.data, packet.timestamp)
                }
                Source::PcapNg { reader, links } => {
                    let block = match reader.next_block()? {
                        Ok(block) => block,
                        Err(error) => return Some(Err(error).context("Bad pcapng block")),
                    };
                    match block {
                        Block::InterfaceDescription(interface) => {
                            let id = links.len() as u32;
                            let link = LinkType::from_datalink(interface.linktype);
                            if link.is_none() {
                                debug!(
                                    "Ignoring interface {} with link type {:?}",
                                    id, interface.linktype
                                );
                            }
                            links.insert(id, link);
                            continue;
                        }
                        Block::EnhancedPacket(packet) => {
                            self.packets += 1;
                            match links.get(&packet.interface_id).copied().flatten() {
                                Some(link) => extract_frame(link, &packet.data, packet.timestamp),
                                None => None,
                            }
                        }
                        _ => continue,
                    }
                }
            };

            match frame {
                Some(frame) => return Some(Ok(frame)),
                None => self.skipped += 1,
            }
        }
    }
}

impl Iterator for CaptureReader {
    type Item = Result<CapturedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}
