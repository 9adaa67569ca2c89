//! Producer side: landmarks to published LiveLink snapshots

use std::sync::Arc;
use bytes::Bytes;
use chrono::Timelike;

use facelink_core::FacelinkResult;
use facelink_geometry::{FaceFeatures, FaceLandmarks, HeadRotation};
use facelink_mapper::BlendshapeMapper;
use facelink_state::AnimationFrame;
use facelink_transport::SnapshotSlot;
use facelink_wire::LiveLinkEncoder;

use crate::config::StreamConfig;

/// Owns the streamed frame and feeds the transport slot.
///
/// There is one pipeline per session and it is the only writer of its
/// frame; the transport only ever sees encoded bytes.
#[derive(Debug)]
pub struct FacePipeline {
    frame: AnimationFrame,
    mapper: BlendshapeMapper,
    slot: Arc<SnapshotSlot>,
    last_features: Option<FaceFeatures>,
    processed: u64,
    faces: u64,
}

impl FacePipeline {
    pub fn new(frame: AnimationFrame, mapper: BlendshapeMapper, slot: Arc<SnapshotSlot>) -> Self {
        FacePipeline {
            frame,
            mapper,
            slot,
            last_features: None,
            processed: 0,
            faces: 0,
        }
    }

    /// Pipeline with a fresh frame and the default MediaPipe mapper
    pub fn from_config(config: &StreamConfig, slot: Arc<SnapshotSlot>) -> FacelinkResult<Self> {
        Ok(Self::new(
            config.build_frame()?,
            BlendshapeMapper::default(),
            slot,
        ))
    }

    /// Process one video frame's worth of tracking output.
    ///
    /// With a face, the metric landmarks (and the head pose, if any) update
    /// the frame. Without one the frame is left as is. Either way the frame
    /// is stamped, encoded and published, and the encoded bytes returned.
    pub fn process<T: Timelike>(
        &mut self,
        face: Option<&FaceLandmarks>,
        rotation: Option<HeadRotation>,
        now: &T,
    ) -> Bytes {
        self.processed += 1;

        match face {
            Some(face) => {
                self.faces += 1;
                let features = self.mapper.map(&face.metric, &mut self.frame);
                if let Some(rotation) = rotation {
                    self.mapper.apply_head_rotation(&rotation, &mut self.frame);
                }
                self.last_features = Some(features);
            }
            None => {
                tracing::trace!("No face in frame, republishing last values");
            }
        }

        self.publish(now)
    }

    /// Stamp, encode and publish the frame as it currently is
    pub fn publish<T: Timelike>(&mut self, now: &T) -> Bytes {
        self.frame.stamp(now);
        let snapshot = LiveLinkEncoder::encode(&self.frame);
        self.slot.publish(snapshot.clone());
        snapshot
    }

    pub fn frame(&self) -> &AnimationFrame {
        &self.frame
    }

    /// Direct access for callers that write channels themselves
    pub fn frame_mut(&mut self) -> &mut AnimationFrame {
        &mut self.frame
    }

    pub fn mapper(&self) -> &BlendshapeMapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut BlendshapeMapper {
        &mut self.mapper
    }

    pub fn slot(&self) -> Arc<SnapshotSlot> {
        Arc::clone(&self.slot)
    }

    /// Features measured for the most recent face
    pub fn last_features(&self) -> Option<&FaceFeatures> {
        self.last_features.as_ref()
    }

    /// Frames processed so far
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Frames processed so far that had a face
    pub fn faces(&self) -> u64 {
        self.faces
    }
}
