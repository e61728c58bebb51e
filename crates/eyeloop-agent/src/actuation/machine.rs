// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Actuation state machine
//!
//! [`transition`] is a pure function of `(behavior, state, event)`; the
//! [`ActuationMachine`] wrapper only owns the state and logs phase changes.
//! Only detection index 0 is ever consulted.
//!
//! Gesture behavior:
//!
//! | State              | Event          | Action                         | Next               |
//! |--------------------|----------------|--------------------------------|--------------------|
//! | AwaitingPrimaryCue | >= 1 detection | ack frame, request fist + palm | Reactive           |
//! | AwaitingPrimaryCue | no detections  | none                           | AwaitingPrimaryCue |
//! | Reactive           | HAND_PALM      | palm frame                     | Reactive           |
//! | Reactive           | HAND_FIST      | toggle blink flag, fist frame  | Reactive           |
//! | Reactive           | other / empty  | none                           | Reactive           |
//!
//! Geometry mapping stays in `AwaitingPrimaryCue`: an empty event turns the
//! ring off, a FACE at index 0 maps its position onto the ring, anything
//! else is ignored.

use eyeloop_protocol::{DetectionEvent, DetectionType, LedFrame};
use tracing::{debug, info};

use super::behavior::{Behavior, GeometryMapping, GestureControl, GESTURE_DETECTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingPrimaryCue,
    Reactive,
}

/// Mutable state of one session; reset only by restarting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: Phase,
    /// Last fist frame was lit
    pub blink_on: bool,
}

/// Outbound work produced by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum ActuationCommand {
    /// Actuation command on the actuator's config channel
    SetFrame(LedFrame),
    /// Replace the requested detection-type set on the sensor
    RequestDetections(Vec<DetectionType>),
}

/// Commands issued once when the session starts
pub fn start_commands(behavior: &Behavior) -> Vec<ActuationCommand> {
    let request = ActuationCommand::RequestDetections(vec![behavior.primary_cue()]);
    match behavior {
        Behavior::Gesture(gesture) => vec![
            request,
            ActuationCommand::SetFrame(gesture.frame(gesture.idle)),
        ],
        Behavior::GeometryMapping(_) | Behavior::Report => vec![request],
    }
}

/// Advance the machine by one event
pub fn transition(
    behavior: &Behavior,
    state: SessionState,
    event: &DetectionEvent,
) -> (SessionState, Vec<ActuationCommand>) {
    match behavior {
        Behavior::GeometryMapping(mapping) => (state, geometry_commands(mapping, event)),
        Behavior::Gesture(gesture) => gesture_transition(gesture, state, event),
        Behavior::Report => (state, Vec::new()),
    }
}

fn geometry_commands(mapping: &GeometryMapping, event: &DetectionEvent) -> Vec<ActuationCommand> {
    match event.primary() {
        None => vec![ActuationCommand::SetFrame(mapping.off_frame())],
        Some(detection) if detection.tag == DetectionType::Face => {
            vec![ActuationCommand::SetFrame(mapping.frame_at(detection.location))]
        }
        Some(_) => Vec::new(),
    }
}

fn gesture_transition(
    gesture: &GestureControl,
    state: SessionState,
    event: &DetectionEvent,
) -> (SessionState, Vec<ActuationCommand>) {
    let Some(detection) = event.primary() else {
        return (state, Vec::new());
    };

    match state.phase {
        Phase::AwaitingPrimaryCue => (
            SessionState {
                phase: Phase::Reactive,
                ..state
            },
            vec![
                ActuationCommand::SetFrame(gesture.frame(gesture.ack)),
                ActuationCommand::RequestDetections(GESTURE_DETECTIONS.to_vec()),
            ],
        ),
        Phase::Reactive => match detection.tag {
            DetectionType::HandPalm => (
                state,
                vec![ActuationCommand::SetFrame(
                    gesture.frame(gesture.palm_value(detection.location)),
                )],
            ),
            DetectionType::HandFist => {
                let blink_on = !state.blink_on;
                (
                    SessionState { blink_on, ..state },
                    vec![ActuationCommand::SetFrame(
                        gesture.frame(gesture.fist_value(blink_on)),
                    )],
                )
            }
            _ => (state, Vec::new()),
        },
    }
}

/// Owns the session state; the single writer of it
#[derive(Debug, Clone)]
pub struct ActuationMachine {
    behavior: Behavior,
    state: SessionState,
}

impl ActuationMachine {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            state: SessionState::default(),
        }
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn start(&self) -> Vec<ActuationCommand> {
        start_commands(&self.behavior)
    }

    /// Apply one event and return the commands it produced
    pub fn handle(&mut self, event: &DetectionEvent) -> Vec<ActuationCommand> {
        let (next, commands) = transition(&self.behavior, self.state, event);

        if next.phase != self.state.phase {
            info!(
                "[SESSION] {} behavior: {:?} -> {:?}",
                self.behavior.name(),
                self.state.phase,
                next.phase
            );
        }
        if let Some(detection) = event.primary() {
            debug!(
                "[SESSION] Primary detection {} at ({}, {}), {} command(s)",
                detection.tag,
                detection.location.x,
                detection.location.y,
                commands.len()
            );
        }

        self.state = next;
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyeloop_protocol::{Detection, LedChannel, LedValue};

    fn event(tag: DetectionType, x: f32, y: f32) -> DetectionEvent {
        DetectionEvent::single(Detection::new(tag, x, y))
    }

    fn frames(commands: &[ActuationCommand]) -> Vec<&LedFrame> {
        commands
            .iter()
            .filter_map(|c| match c {
                ActuationCommand::SetFrame(frame) => Some(frame),
                ActuationCommand::RequestDetections(_) => None,
            })
            .collect()
    }

    fn geometry() -> Behavior {
        Behavior::GeometryMapping(GeometryMapping::default())
    }

    fn gesture() -> Behavior {
        Behavior::Gesture(GestureControl::default())
    }

    #[test]
    fn test_geometry_empty_event_turns_ring_off() {
        let (state, commands) =
            transition(&geometry(), SessionState::default(), &DetectionEvent::empty());
        assert_eq!(state, SessionState::default());
        let frames = frames(&commands);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_off());
        assert_eq!(frames[0].len(), 35);
    }

    #[test]
    fn test_geometry_maps_face_position() {
        let (_, commands) = transition(
            &geometry(),
            SessionState::default(),
            &event(DetectionType::Face, 0.0, 0.0),
        );
        assert_eq!(
            commands,
            vec![ActuationCommand::SetFrame(
                LedFrame::uniform(35, LedValue::rgbw(80, 0, 0, 0)).unwrap()
            )]
        );

        let (_, commands) = transition(
            &geometry(),
            SessionState::default(),
            &event(DetectionType::Face, 640.0, 480.0),
        );
        let value = frames(&commands)[0].uniform_value().unwrap();
        assert_eq!(value.channel(LedChannel::Red), 0);
        assert_eq!(value.channel(LedChannel::Blue), 80);
    }

    #[test]
    fn test_geometry_only_consults_index_zero() {
        let mixed = DetectionEvent::new(vec![
            Detection::new(DetectionType::HandPalm, 0.0, 0.0),
            Detection::new(DetectionType::Face, 0.0, 0.0),
        ]);
        let (_, commands) = transition(&geometry(), SessionState::default(), &mixed);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_geometry_never_leaves_first_phase() {
        let mut machine = ActuationMachine::new(geometry());
        machine.handle(&event(DetectionType::Face, 10.0, 10.0));
        machine.handle(&DetectionEvent::empty());
        assert_eq!(machine.phase(), Phase::AwaitingPrimaryCue);
    }

    #[test]
    fn test_gesture_start_commands() {
        let commands = start_commands(&gesture());
        assert_eq!(
            commands[0],
            ActuationCommand::RequestDetections(vec![DetectionType::Face])
        );
        assert_eq!(
            frames(&commands)[0].uniform_value(),
            Some(LedValue::rgbw(0, 0, 0, 2))
        );
    }

    #[test]
    fn test_gesture_waits_for_any_detection() {
        let mut machine = ActuationMachine::new(gesture());
        assert!(machine.handle(&DetectionEvent::empty()).is_empty());
        assert_eq!(machine.phase(), Phase::AwaitingPrimaryCue);

        // presence alone is the trigger, the tag does not matter
        let commands = machine.handle(&event(DetectionType::HandThumbUp, 1.0, 1.0));
        assert_eq!(machine.phase(), Phase::Reactive);
        assert_eq!(
            commands,
            vec![
                ActuationCommand::SetFrame(
                    LedFrame::uniform(35, LedValue::rgbw(0, 10, 0, 0)).unwrap()
                ),
                ActuationCommand::RequestDetections(vec![
                    DetectionType::HandFist,
                    DetectionType::HandPalm
                ]),
            ]
        );
    }

    #[test]
    fn test_gesture_transition_happens_once() {
        let mut machine = ActuationMachine::new(gesture());
        let mut reconfigurations = 0;
        for _ in 0..5 {
            reconfigurations += machine
                .handle(&event(DetectionType::Face, 100.0, 100.0))
                .iter()
                .filter(|c| matches!(c, ActuationCommand::RequestDetections(_)))
                .count();
        }
        assert_eq!(reconfigurations, 1);
        assert_eq!(machine.phase(), Phase::Reactive);
    }

    #[test]
    fn test_fist_alternates() {
        let behavior = gesture();
        let reactive = SessionState {
            phase: Phase::Reactive,
            blink_on: false,
        };
        let fist = event(DetectionType::HandFist, 0.0, 0.0);

        let (state, first) = transition(&behavior, reactive, &fist);
        let (state, second) = transition(&behavior, state, &fist);

        assert_eq!(
            frames(&first)[0].uniform_value(),
            Some(LedValue::rgbw(0, 10, 0, 0))
        );
        assert!(frames(&second)[0].is_off());
        assert!(!state.blink_on);
    }

    #[test]
    fn test_palm_maps_position() {
        let reactive = SessionState {
            phase: Phase::Reactive,
            blink_on: true,
        };
        let (state, commands) =
            transition(&gesture(), reactive, &event(DetectionType::HandPalm, 100.0, 50.0));
        assert_eq!(state, reactive);
        assert_eq!(
            frames(&commands)[0].uniform_value(),
            Some(LedValue::rgbw(20, 0, 10, 0))
        );
    }

    #[test]
    fn test_reactive_ignores_other_tags_and_empty_events() {
        let reactive = SessionState {
            phase: Phase::Reactive,
            blink_on: true,
        };
        for ev in [
            event(DetectionType::Face, 1.0, 1.0),
            event(DetectionType::Other(42), 1.0, 1.0),
            DetectionEvent::empty(),
        ] {
            let (state, commands) = transition(&gesture(), reactive, &ev);
            assert_eq!(state, reactive);
            assert!(commands.is_empty());
        }
    }

    #[test]
    fn test_every_frame_has_full_length() {
        let behaviors = [geometry(), gesture()];
        let events = [
            DetectionEvent::empty(),
            event(DetectionType::Face, 320.0, 240.0),
            event(DetectionType::HandPalm, 2000.0, -5.0),
            event(DetectionType::HandFist, 0.0, 0.0),
            event(DetectionType::HandFist, 0.0, 0.0),
        ];
        for behavior in behaviors {
            let mut machine = ActuationMachine::new(behavior);
            let mut commands = machine.start();
            for ev in &events {
                commands.extend(machine.handle(ev));
            }
            for frame in frames(&commands) {
                assert_eq!(frame.len(), 35);
            }
        }
    }

    #[test]
    fn test_report_never_actuates() {
        let mut machine = ActuationMachine::new(Behavior::Report);
        assert_eq!(
            machine.start(),
            vec![ActuationCommand::RequestDetections(vec![
                DetectionType::FaceDemographics
            ])]
        );
        assert!(machine.handle(&event(DetectionType::FaceDemographics, 1.0, 1.0)).is_empty());
    }
}
