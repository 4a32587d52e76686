// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Packs chains of quads into a streaming buffer fill.
//!
//! A submitter keeps a [`ChainCursor`] across fills and calls [`pack_chains`]
//! until the cursor has passed the last chain. Each call copies as many quads as
//! the fill can take and describes where every copied run came from with a
//! [`ChainSegment`]. A chain that does not fit entirely is split: the next fill
//! resumes it at the exact quad where the previous one stopped.

use super::streaming::QuadWriter;
use bytemuck::Pod;

/// Position of the packer in a list of chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainCursor {
    /// The chain being consumed.
    pub chain: usize,
    /// Quads of `chain` already consumed.
    pub offset: usize,
}

impl ChainCursor {
    /// Returns `true` once every one of `chain_count` chains has been consumed.
    #[inline]
    pub fn is_done(&self, chain_count: usize) -> bool {
        self.chain >= chain_count
    }
}

/// A run of quads copied from one chain into one fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSegment {
    /// Index of the source chain.
    pub chain: usize,
    /// First copied quad within the chain.
    pub chain_offset: usize,
    /// First quad of the run within the fill.
    pub buffer_quad: usize,
    /// Number of quads in the run.
    pub quad_count: usize,
}

/// Copies quads from `chain(cursor.chain..)` into `writer` until the writer is
/// full or every chain is consumed.
///
/// `chain(i)` returns the vertices of chain `i` (4 per quad). Empty chains are
/// skipped without producing a segment. `segments` is cleared, then receives one
/// entry per copied run, in buffer order.
pub fn pack_chains<'c, V, F>(
    writer: &mut QuadWriter<'_, V>,
    chain_count: usize,
    chain: F,
    cursor: &mut ChainCursor,
    segments: &mut Vec<ChainSegment>,
) where
    V: Pod + 'c,
    F: Fn(usize) -> &'c [V],
{
    segments.clear();

    while !cursor.is_done(chain_count) && writer.remaining() > 0 {
        let vertices = chain(cursor.chain);
        debug_assert!(vertices.len() % 4 == 0, "malformed sprite chain");
        let chain_quads = vertices.len() / 4;
        debug_assert!(cursor.offset <= chain_quads, "cursor past end of chain");

        let count = writer.remaining().min(chain_quads - cursor.offset);
        if count > 0 {
            segments.push(ChainSegment {
                chain: cursor.chain,
                chain_offset: cursor.offset,
                buffer_quad: writer.len(),
                quad_count: count,
            });
            writer.write_quads(&vertices[cursor.offset * 4..(cursor.offset + count) * 4]);
            cursor.offset += count;
        }

        if cursor.offset == chain_quads {
            cursor.chain += 1;
            cursor.offset = 0;
        }
    }

    // An exactly full fill can leave only empty chains behind; skip them now so
    // the caller does not open a fill with nothing to write.
    while !cursor.is_done(chain_count) && chain(cursor.chain).is_empty() {
        cursor.chain += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::super::streaming::StreamingVertexBuffer;
    use super::super::test_device::RecordingDevice;
    use super::*;
    use lumen_core::renderer::api::SpriteVertex;

    /// Chains whose vertices encode (chain, quad) in their position.
    fn chains(quad_counts: &[usize]) -> Vec<Vec<SpriteVertex>> {
        quad_counts
            .iter()
            .enumerate()
            .map(|(c, &count)| {
                (0..count * 4)
                    .map(|v| SpriteVertex {
                        position: [c as f32, (v / 4) as f32, 0.0],
                        ..Default::default()
                    })
                    .collect()
            })
            .collect()
    }

    /// Packs everything, returning each fill's segments and the order of the packed quads.
    fn pack_all(
        quad_counts: &[usize],
        capacity: usize,
    ) -> (Vec<Vec<ChainSegment>>, Vec<(usize, usize)>) {
        let data = chains(quad_counts);
        let mut device = RecordingDevice::default();
        let vertex_size = std::mem::size_of::<SpriteVertex>() as u64;
        let mut streaming =
            StreamingVertexBuffer::new(&mut device, vertex_size * 4 * capacity as u64, capacity)
                .unwrap();

        let mut cursor = ChainCursor::default();
        let mut segments = Vec::new();
        let mut fills = Vec::new();
        let mut gathered = Vec::new();

        while !cursor.is_done(data.len()) {
            let mut writer = streaming.map::<SpriteVertex>(&mut device);
            pack_chains(&mut writer, data.len(), |i| &data[i], &mut cursor, &mut segments);
            let written = writer.unmap().unwrap();
            assert_eq!(written, segments.iter().map(|s| s.quad_count).sum::<usize>());

            if segments.is_empty() {
                continue;
            }

            let uploaded: Vec<SpriteVertex> = bytemuck::pod_collect_to_vec(device.last_write());
            for segment in &segments {
                for q in 0..segment.quad_count {
                    let v = uploaded[(segment.buffer_quad + q) * 4];
                    assert_eq!(v.position[0] as usize, segment.chain);
                    gathered.push((v.position[0] as usize, v.position[1] as usize));
                }
            }
            fills.push(segments.clone());
        }
        (fills, gathered)
    }

    fn expected_order(quad_counts: &[usize]) -> Vec<(usize, usize)> {
        quad_counts
            .iter()
            .enumerate()
            .flat_map(|(c, &count)| (0..count).map(move |q| (c, q)))
            .collect()
    }

    #[test]
    fn test_chain_equal_to_capacity_is_one_fill() {
        let (fills, _) = pack_all(&[8], 8);
        assert_eq!(fills.len(), 1);
        assert_eq!(
            fills[0],
            vec![ChainSegment {
                chain: 0,
                chain_offset: 0,
                buffer_quad: 0,
                quad_count: 8
            }]
        );
    }

    #[test]
    fn test_chain_one_over_capacity_resumes_at_offset() {
        let (fills, _) = pack_all(&[9], 8);
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0][0].quad_count, 8);
        assert_eq!(
            fills[1],
            vec![ChainSegment {
                chain: 0,
                chain_offset: 8,
                buffer_quad: 0,
                quad_count: 1
            }]
        );
    }

    #[test]
    fn test_fill_count_and_round_trip() {
        for (counts, capacity) in [
            (vec![3, 5, 2], 4),
            (vec![1; 10], 3),
            (vec![7, 0, 7], 7),
            (vec![13], 5),
            (vec![2, 2, 2, 2], 8),
        ] {
            let total: usize = counts.iter().sum();
            let (fills, gathered) = pack_all(&counts, capacity);
            assert_eq!(fills.len(), total.div_ceil(capacity), "{counts:?} / {capacity}");
            assert_eq!(gathered, expected_order(&counts));
        }
    }

    #[test]
    fn test_split_chain_keeps_exact_offsets() {
        let (fills, _) = pack_all(&[3, 5, 2], 4);
        // 3 + 1 | 4 | 2
        assert_eq!(fills[0].len(), 2);
        assert_eq!(fills[0][1].chain_offset, 0);
        assert_eq!(fills[0][1].buffer_quad, 3);
        assert_eq!(fills[1][0].chain, 1);
        assert_eq!(fills[1][0].chain_offset, 1);
        assert_eq!(fills[1][0].quad_count, 4);
        assert_eq!(fills[2][0].chain, 2);
    }

    #[test]
    fn test_empty_chains_produce_nothing() {
        let (fills, gathered) = pack_all(&[0, 0], 4);
        assert!(fills.is_empty());
        assert!(gathered.is_empty());

        let (fills, _) = pack_all(&[], 4);
        assert!(fills.is_empty());
    }

    #[test]
    fn test_empty_chains_write_no_segments() {
        let data = chains(&[0, 0, 0]);
        let mut device = RecordingDevice::default();
        let vertex_size = std::mem::size_of::<SpriteVertex>() as u64;
        let mut streaming =
            StreamingVertexBuffer::new(&mut device, vertex_size * 16, 4).unwrap();
        let mut cursor = ChainCursor::default();
        let mut segments = vec![ChainSegment {
            chain: 9,
            chain_offset: 0,
            buffer_quad: 0,
            quad_count: 1,
        }];

        let mut writer = streaming.map::<SpriteVertex>(&mut device);
        pack_chains(&mut writer, data.len(), |i| &data[i], &mut cursor, &mut segments);
        assert_eq!(writer.unmap().unwrap(), 0);

        assert!(segments.is_empty());
        assert!(cursor.is_done(data.len()));
    }

    #[test]
    fn test_trailing_empty_chain_after_full_fill() {
        let (fills, _) = pack_all(&[4, 0], 4);
        assert_eq!(fills.len(), 1);
    }
}
