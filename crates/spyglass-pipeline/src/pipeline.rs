use thiserror::Error;

use crate::stage::{PipelineStage, StageFault, StageValue};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no stage named `{0}`")]
    StageNotFound(String),
    #[error("stage name `{0}` already in use")]
    DuplicateName(String),
}

struct Slot {
    name: String,
    // Taken out for the duration of the stage's own invocation.
    stage: Option<Box<dyn PipelineStage>>,
}

/// An ordered list of named stages for one connection.
///
/// Inbound values run through the stages front to back, outbound values back
/// to front; the last stage is conventionally the terminal raw-bytes ⇄
/// native-packet conversion. A stage displaced by [`wrap`](Pipeline::wrap)
/// stays addressable under its own name: [`replace`](Pipeline::replace)
/// swaps the wrapped stage in place and leaves the wrapper installed, which
/// is how a foreign layer renegotiating its stage mid-session keeps being
/// delegated to.
#[derive(Default)]
pub struct Pipeline {
    slots: Vec<Slot>,
    wrapped: Vec<(String, Box<dyn PipelineStage>)>,
}

/// Handed to a stage during invocation; grants access to stages wrapped
/// elsewhere in the pipeline so wrappers delegate to the current occupant
/// rather than a cached one.
pub struct StageContext<'a> {
    wrapped: &'a mut Vec<(String, Box<dyn PipelineStage>)>,
}

impl<'a> StageContext<'a> {
    /// Build a context over an external wrapped-stage store, for exercising
    /// a stage outside a full pipeline.
    pub fn over(wrapped: &'a mut Vec<(String, Box<dyn PipelineStage>)>) -> Self {
        Self { wrapped }
    }

    pub fn take_wrapped(&mut self, name: &str) -> Option<Box<dyn PipelineStage>> {
        let idx = self.wrapped.iter().position(|(n, _)| n == name)?;
        Some(self.wrapped.remove(idx).1)
    }

    pub fn restore_wrapped(&mut self, name: &str, stage: Box<dyn PipelineStage>) {
        self.wrapped.push((name.to_string(), stage));
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.name == name)
    }

    /// Slot names in walk order. Wrapping does not change this list.
    pub fn stage_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn PipelineStage> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.stage.as_deref())
    }

    pub fn append(
        &mut self,
        name: &str,
        stage: Box<dyn PipelineStage>,
    ) -> Result<(), PipelineError> {
        self.check_free(name)?;
        self.slots.push(Slot {
            name: name.to_string(),
            stage: Some(stage),
        });
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        anchor: &str,
        name: &str,
        stage: Box<dyn PipelineStage>,
    ) -> Result<(), PipelineError> {
        self.check_free(name)?;
        let idx = self.position(anchor)?;
        self.slots.insert(
            idx,
            Slot {
                name: name.to_string(),
                stage: Some(stage),
            },
        );
        Ok(())
    }

    pub fn insert_after(
        &mut self,
        anchor: &str,
        name: &str,
        stage: Box<dyn PipelineStage>,
    ) -> Result<(), PipelineError> {
        self.check_free(name)?;
        let idx = self.position(anchor)?;
        self.slots.insert(
            idx + 1,
            Slot {
                name: name.to_string(),
                stage: Some(stage),
            },
        );
        Ok(())
    }

    /// Swap the stage registered under `name`, returning the displaced one.
    /// When the name is currently wrapped, the *wrapped* stage is swapped and
    /// the wrapper stays in its slot.
    pub fn replace(
        &mut self,
        name: &str,
        stage: Box<dyn PipelineStage>,
    ) -> Option<Box<dyn PipelineStage>> {
        if let Some(entry) = self.wrapped.iter_mut().find(|(n, _)| n == name) {
            return Some(std::mem::replace(&mut entry.1, stage));
        }
        let slot = self.slots.iter_mut().find(|s| s.name == name)?;
        slot.stage.replace(stage)
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn PipelineStage>> {
        let idx = self.slots.iter().position(|s| s.name == name)?;
        self.slots.remove(idx).stage
    }

    /// Decorate the stage at `name`: the occupant moves aside (still
    /// addressable by name) and `wrapper` takes over its slot. Fails with the
    /// wrapper handed back when the slot is missing or already wrapped.
    pub fn wrap(
        &mut self,
        name: &str,
        wrapper: Box<dyn PipelineStage>,
    ) -> Result<(), Box<dyn PipelineStage>> {
        if self.wrapped.iter().any(|(n, _)| n == name) {
            return Err(wrapper);
        }
        let Some(slot) = self.slots.iter_mut().find(|s| s.name == name) else {
            return Err(wrapper);
        };
        let Some(inner) = slot.stage.take() else {
            return Err(wrapper);
        };
        slot.stage = Some(wrapper);
        self.wrapped.push((name.to_string(), inner));
        Ok(())
    }

    /// Undo [`wrap`](Pipeline::wrap): the currently wrapped stage (which may
    /// have been renegotiated since install) returns to its slot and the
    /// wrapper is handed back.
    pub fn unwrap(&mut self, name: &str) -> Option<Box<dyn PipelineStage>> {
        let idx = self.wrapped.iter().position(|(n, _)| n == name)?;
        let slot_exists = self.slots.iter().any(|s| s.name == name);
        if !slot_exists {
            return None;
        }
        let (_, inner) = self.wrapped.remove(idx);
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.name == name)
            .expect("slot checked above");
        slot.stage.replace(inner)
    }

    /// Run an inbound value through the stages front to back. A stage fault
    /// of `Cancelled` drops the offending message only; other faults abort
    /// the walk with the pipeline left consistent for subsequent messages.
    pub fn run_decode(&mut self, input: StageValue) -> Result<Vec<StageValue>, StageFault> {
        self.run(input, true)
    }

    /// Run an outbound value through the stages back to front.
    pub fn run_encode(&mut self, input: StageValue) -> Result<Vec<StageValue>, StageFault> {
        self.run(input, false)
    }

    fn run(&mut self, input: StageValue, inbound: bool) -> Result<Vec<StageValue>, StageFault> {
        let mut values = vec![input];
        let order: Vec<usize> = if inbound {
            (0..self.slots.len()).collect()
        } else {
            (0..self.slots.len()).rev().collect()
        };
        for idx in order {
            if values.is_empty() {
                break;
            }
            let Some(mut stage) = self.slots[idx].stage.take() else {
                continue;
            };
            let mut produced = Vec::new();
            let mut failure = None;
            for value in values.drain(..) {
                let mut ctx = StageContext {
                    wrapped: &mut self.wrapped,
                };
                let result = if inbound {
                    stage.decode(&mut ctx, value)
                } else {
                    stage.encode(&mut ctx, value)
                };
                match result {
                    Ok(outputs) => produced.extend(outputs),
                    Err(StageFault::Cancelled) => {}
                    Err(fault) => {
                        failure = Some(fault);
                        break;
                    }
                }
            }
            self.slots[idx].stage = Some(stage);
            if let Some(fault) = failure {
                return Err(fault);
            }
            values = produced;
        }
        Ok(values)
    }

    fn position(&self, name: &str) -> Result<usize, PipelineError> {
        self.slots
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| PipelineError::StageNotFound(name.to_string()))
    }

    fn check_free(&self, name: &str) -> Result<(), PipelineError> {
        if self.contains(name) {
            return Err(PipelineError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spyglass_codec::WireCursor;

    struct Tag(u8);

    impl PipelineStage for Tag {
        fn decode(
            &mut self,
            _ctx: &mut StageContext<'_>,
            input: StageValue,
        ) -> Result<Vec<StageValue>, StageFault> {
            match input {
                StageValue::Raw(mut cur) => {
                    cur.put_u8(self.0);
                    Ok(vec![StageValue::Raw(cur)])
                }
                other => Ok(vec![other]),
            }
        }
    }

    struct Splitter;

    impl PipelineStage for Splitter {
        fn decode(
            &mut self,
            _ctx: &mut StageContext<'_>,
            input: StageValue,
        ) -> Result<Vec<StageValue>, StageFault> {
            let cur = match input {
                StageValue::Raw(cur) => cur,
                other => return Ok(vec![other]),
            };
            Ok(cur
                .as_slice()
                .iter()
                .map(|b| StageValue::Raw(WireCursor::from_slice(&[*b])))
                .collect())
        }
    }

    #[test]
    fn test_ordered_insertion() {
        let mut pipeline = Pipeline::new();
        pipeline.append("framer", Box::new(Tag(1))).unwrap();
        pipeline.append("codec", Box::new(Tag(2))).unwrap();
        pipeline
            .insert_before("codec", "translator", Box::new(Tag(3)))
            .unwrap();
        pipeline
            .insert_after("framer", "logger", Box::new(Tag(4)))
            .unwrap();
        assert_eq!(
            pipeline.stage_names(),
            vec!["framer", "logger", "translator", "codec"]
        );
        assert_eq!(
            pipeline.append("codec", Box::new(Tag(9))),
            Err(PipelineError::DuplicateName("codec".into()))
        );
    }

    #[test]
    fn test_decode_runs_front_to_back() {
        let mut pipeline = Pipeline::new();
        pipeline.append("a", Box::new(Tag(1))).unwrap();
        pipeline.append("b", Box::new(Tag(2))).unwrap();
        let out = pipeline
            .run_decode(StageValue::Raw(WireCursor::new()))
            .unwrap();
        let [StageValue::Raw(cur)] = &out[..] else {
            panic!("expected one raw value");
        };
        assert_eq!(cur.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_encode_runs_back_to_front() {
        struct TagEncode(u8);
        impl PipelineStage for TagEncode {
            fn encode(
                &mut self,
                _ctx: &mut StageContext<'_>,
                input: StageValue,
            ) -> Result<Vec<StageValue>, StageFault> {
                match input {
                    StageValue::Raw(mut cur) => {
                        cur.put_u8(self.0);
                        Ok(vec![StageValue::Raw(cur)])
                    }
                    other => Ok(vec![other]),
                }
            }
        }

        let mut pipeline = Pipeline::new();
        pipeline.append("a", Box::new(TagEncode(1))).unwrap();
        pipeline.append("b", Box::new(TagEncode(2))).unwrap();
        let out = pipeline
            .run_encode(StageValue::Raw(WireCursor::new()))
            .unwrap();
        let [StageValue::Raw(cur)] = &out[..] else {
            panic!("expected one raw value");
        };
        assert_eq!(cur.as_slice(), &[2, 1]);
    }

    #[test]
    fn test_multi_output_preserves_order() {
        let mut pipeline = Pipeline::new();
        pipeline.append("splitter", Box::new(Splitter)).unwrap();
        pipeline.append("tagger", Box::new(Tag(9))).unwrap();
        let out = pipeline
            .run_decode(StageValue::Raw(WireCursor::from_slice(&[5, 6, 7])))
            .unwrap();
        let bytes: Vec<Vec<u8>> = out
            .iter()
            .map(|v| match v {
                StageValue::Raw(c) => c.as_slice().to_vec(),
                _ => panic!("expected raw"),
            })
            .collect();
        assert_eq!(bytes, vec![vec![5, 9], vec![6, 9], vec![7, 9]]);
    }

    #[test]
    fn test_cancelled_fault_drops_single_message() {
        struct DropOdd;
        impl PipelineStage for DropOdd {
            fn decode(
                &mut self,
                _ctx: &mut StageContext<'_>,
                input: StageValue,
            ) -> Result<Vec<StageValue>, StageFault> {
                let StageValue::Raw(cur) = &input else {
                    return Ok(vec![input]);
                };
                if cur.as_slice()[0] % 2 == 1 {
                    return Err(StageFault::Cancelled);
                }
                Ok(vec![input])
            }
        }

        let mut pipeline = Pipeline::new();
        pipeline.append("splitter", Box::new(Splitter)).unwrap();
        pipeline.append("filter", Box::new(DropOdd)).unwrap();
        let out = pipeline
            .run_decode(StageValue::Raw(WireCursor::from_slice(&[1, 2, 3, 4])))
            .unwrap();
        let bytes: Vec<u8> = out
            .iter()
            .map(|v| match v {
                StageValue::Raw(c) => c.as_slice()[0],
                _ => panic!("expected raw"),
            })
            .collect();
        assert_eq!(bytes, vec![2, 4]);
    }

    #[test]
    fn test_replace_routes_into_wrapped_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.append("codec", Box::new(Tag(1))).unwrap();
        pipeline.wrap("codec", Box::new(Tag(7))).map_err(|_| ()).unwrap();

        // The foreign layer renegotiates its stage by name; the wrapper must
        // stay installed and the displaced stage must be the old inner one.
        let displaced = pipeline.replace("codec", Box::new(Tag(2))).unwrap();
        let mut ctx_store = Vec::new();
        let mut ctx = StageContext {
            wrapped: &mut ctx_store,
        };
        let mut displaced = displaced;
        let out = displaced
            .decode(&mut ctx, StageValue::Raw(WireCursor::new()))
            .unwrap();
        let [StageValue::Raw(cur)] = &out[..] else {
            panic!();
        };
        assert_eq!(cur.as_slice(), &[1]);

        // The walk still hits the wrapper, not the new inner stage.
        let out = pipeline
            .run_decode(StageValue::Raw(WireCursor::new()))
            .unwrap();
        let [StageValue::Raw(cur)] = &out[..] else {
            panic!();
        };
        assert_eq!(cur.as_slice(), &[7]);
    }

    #[test]
    fn test_wrap_then_unwrap_restores_stage_list() {
        let mut pipeline = Pipeline::new();
        pipeline.append("framer", Box::new(Tag(1))).unwrap();
        pipeline.append("codec", Box::new(Tag(2))).unwrap();
        let before = pipeline
            .stage_names()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        pipeline.wrap("codec", Box::new(Tag(9))).map_err(|_| ()).unwrap();
        assert_eq!(
            pipeline.stage_names(),
            before.iter().map(String::as_str).collect::<Vec<_>>()
        );

        let wrapper = pipeline.unwrap("codec");
        assert!(wrapper.is_some());
        assert_eq!(
            pipeline.stage_names(),
            before.iter().map(String::as_str).collect::<Vec<_>>()
        );

        // Behaviour is back to the original stage.
        let out = pipeline
            .run_decode(StageValue::Raw(WireCursor::new()))
            .unwrap();
        let [StageValue::Raw(cur)] = &out[..] else {
            panic!();
        };
        assert_eq!(cur.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_double_wrap_rejected() {
        let mut pipeline = Pipeline::new();
        pipeline.append("codec", Box::new(Tag(1))).unwrap();
        assert!(pipeline.wrap("codec", Box::new(Tag(2))).is_ok());
        assert!(pipeline.wrap("codec", Box::new(Tag(3))).is_err());
    }
}
