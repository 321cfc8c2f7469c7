//! Positional argument decoding for host calls.

use glam::{Mat3, Vec3};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Command, CommandError};
use crate::scene::ObjectId;

/// Cursor over a call's positional arguments.
struct Args {
    method: &'static str,
    values: std::vec::IntoIter<Value>,
}

impl Args {
    fn new(method: &'static str, values: Vec<Value>) -> Self {
        Self {
            method,
            values: values.into_iter(),
        }
    }

    fn invalid(&self, name: &'static str, reason: impl ToString) -> CommandError {
        CommandError::InvalidArgument {
            method: self.method,
            name,
            reason: reason.to_string(),
        }
    }

    fn required(&mut self, name: &'static str) -> Result<Value, CommandError> {
        self.values.next().ok_or(CommandError::MissingArgument {
            method: self.method,
            name,
        })
    }

    fn value<T: DeserializeOwned>(&mut self, name: &'static str) -> Result<T, CommandError> {
        let value = self.required(name)?;
        serde_json::from_value(value).map_err(|e| self.invalid(name, e))
    }

    /// Object ids arrive as strings; integral numbers are accepted too.
    fn id(&mut self, name: &'static str) -> Result<ObjectId, CommandError> {
        let value = self.required(name)?;
        self.to_id(name, value)
    }

    /// Missing and `null` both mean "no id".
    fn optional_id(&mut self, name: &'static str) -> Result<Option<ObjectId>, CommandError> {
        match self.values.next() {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.to_id(name, value).map(Some),
        }
    }

    fn to_id(&self, name: &'static str, value: Value) -> Result<ObjectId, CommandError> {
        match value {
            Value::String(s) if !s.is_empty() => Ok(ObjectId::new(s)),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(ObjectId::new(n.to_string())),
            other => Err(self.invalid(name, format!("expected an object id, got {other}"))),
        }
    }

    fn vec3(&mut self) -> Result<Vec3, CommandError> {
        let x = self.value::<f32>("x")?;
        let y = self.value::<f32>("y")?;
        let z = self.value::<f32>("z")?;
        Ok(Vec3::new(x, y, z))
    }

    /// Row-major 3x3 matrix, nested (`[[..],[..],[..]]`) or flat (9 numbers).
    fn mat3(&mut self, name: &'static str) -> Result<Mat3, CommandError> {
        let value = self.required(name)?;
        let rows: [[f32; 3]; 3] = match serde_json::from_value::<[[f32; 3]; 3]>(value.clone()) {
            Ok(rows) => rows,
            Err(_) => {
                let flat: [f32; 9] = serde_json::from_value(value)
                    .map_err(|_| self.invalid(name, "expected a 3x3 matrix"))?;
                [
                    [flat[0], flat[1], flat[2]],
                    [flat[3], flat[4], flat[5]],
                    [flat[6], flat[7], flat[8]],
                ]
            }
        };
        Ok(Mat3::from_cols_array_2d(&rows).transpose())
    }

    /// Optional payload; absent means `{}`.
    fn data(&mut self) -> Value {
        self.values
            .next()
            .unwrap_or_else(|| Value::Object(Default::default()))
    }

    fn rest(self) -> Vec<Value> {
        self.values.collect()
    }
}

fn method_name(method: &str) -> Option<&'static str> {
    Some(match method {
        "create" => "create",
        "name" => "name",
        "move" => "move",
        "scale" => "scale",
        "rotate" => "rotate",
        "visible" => "visible",
        "delete" => "delete",
        "attach" => "attach",
        "resize" => "resize",
        "init_objects" => "init_objects",
        "run_user_function" => "run_user_function",
        "draw" => "draw",
        _ => return None,
    })
}

impl Command {
    /// Decode a positional host call.
    ///
    /// Trailing arguments beyond the ones a method takes are ignored, except
    /// for `create`, which keeps them as the object's creation arguments.
    pub fn from_call(method: &str, args: Vec<Value>) -> Result<Self, CommandError> {
        let method =
            method_name(method).ok_or_else(|| CommandError::UnknownMethod(method.to_string()))?;
        let mut args = Args::new(method, args);

        let command = match method {
            "create" => {
                let kind = args.value::<String>("type")?;
                let id = args.id("id")?;
                let parent_id = args.optional_id("parent_id")?;
                Self::Create {
                    kind,
                    id,
                    parent_id,
                    args: args.rest(),
                }
            }
            "name" => Self::Name {
                id: args.id("id")?,
                name: args.value("name")?,
            },
            "move" => Self::Move {
                id: args.id("id")?,
                position: args.vec3()?,
            },
            "scale" => Self::Scale {
                id: args.id("id")?,
                scale: args.vec3()?,
            },
            "rotate" => Self::Rotate {
                id: args.id("id")?,
                rotation: args.mat3("R")?,
            },
            "visible" => Self::Visible {
                id: args.id("id")?,
                visible: args.value("value")?,
            },
            "delete" => Self::Delete { id: args.id("id")? },
            "attach" => Self::Attach {
                id: args.id("id")?,
                parent_id: args.optional_id("parent_id")?,
            },
            "resize" => Self::Resize,
            "init_objects" => Self::InitObjects { data: args.data() },
            "run_user_function" => Self::RunUserFunction { data: args.data() },
            "draw" => Self::Draw { data: args.data() },
            other => return Err(CommandError::UnknownMethod(other.to_string())),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(method: &str, args: Value) -> Result<Command, CommandError> {
        let args = match args {
            Value::Array(values) => values,
            other => panic!("args must be an array, got {other}"),
        };
        Command::from_call(method, args)
    }

    #[test]
    fn test_decode_create() {
        assert_eq!(
            decode("create", json!(["mesh", "m1"])).unwrap(),
            Command::Create {
                kind: "mesh".into(),
                id: ObjectId::from("m1"),
                parent_id: None,
                args: vec![],
            }
        );
        assert_eq!(
            decode("create", json!(["mesh", "m1", "g1", {"color": 1}, 2])).unwrap(),
            Command::Create {
                kind: "mesh".into(),
                id: ObjectId::from("m1"),
                parent_id: Some(ObjectId::from("g1")),
                args: vec![json!({"color": 1}), json!(2)],
            }
        );
        assert_eq!(
            decode("create", json!(["mesh", 7, null])).unwrap(),
            Command::Create {
                kind: "mesh".into(),
                id: ObjectId::from("7"),
                parent_id: None,
                args: vec![],
            }
        );
    }

    #[test]
    fn test_decode_transforms() {
        assert_eq!(
            decode("move", json!(["m1", 1, 2.5, -3])).unwrap(),
            Command::Move {
                id: ObjectId::from("m1"),
                position: Vec3::new(1.0, 2.5, -3.0),
            }
        );
        assert_eq!(
            decode("move", json!(["m1", 1, 2])).unwrap_err(),
            CommandError::MissingArgument {
                method: "move",
                name: "z"
            }
        );
        assert!(matches!(
            decode("scale", json!(["m1", "big", 1, 1])),
            Err(CommandError::InvalidArgument { name: "x", .. })
        ));
    }

    #[test]
    fn test_decode_rotation_is_row_major() {
        let nested = decode("rotate", json!(["m1", [[0, -1, 0], [1, 0, 0], [0, 0, 1]]])).unwrap();
        let flat = decode("rotate", json!(["m1", [0, -1, 0, 1, 0, 0, 0, 0, 1]])).unwrap();
        assert_eq!(nested, flat);

        let Command::Rotate { rotation, .. } = nested else {
            panic!("expected rotate");
        };
        // Row-major [[0,-1,0],[1,0,0],...] maps x onto y.
        assert_eq!(rotation * Vec3::X, Vec3::Y);

        assert!(matches!(
            decode("rotate", json!(["m1", [1, 2, 3]])),
            Err(CommandError::InvalidArgument { name: "R", .. })
        ));
    }

    #[test]
    fn test_decode_payload_commands() {
        assert_eq!(decode("resize", json!([])).unwrap(), Command::Resize);
        assert_eq!(
            decode("draw", json!([{"run_function": "draw_cf"}])).unwrap(),
            Command::Draw {
                data: json!({"run_function": "draw_cf"})
            }
        );
        assert_eq!(
            decode("init_objects", json!([])).unwrap(),
            Command::InitObjects { data: json!({}) }
        );
    }

    #[test]
    fn test_decode_rejects_unknown_and_bad_ids() {
        assert_eq!(
            decode("explode", json!([])).unwrap_err(),
            CommandError::UnknownMethod("explode".into())
        );
        assert!(matches!(
            decode("delete", json!([""])),
            Err(CommandError::InvalidArgument { name: "id", .. })
        ));
        assert!(matches!(
            decode("visible", json!(["m1", "yes"])),
            Err(CommandError::InvalidArgument { name: "value", .. })
        ));
    }

    #[test]
    fn test_method_roundtrip() {
        for method in ["resize", "init_objects", "draw", "run_user_function"] {
            assert_eq!(decode(method, json!([])).unwrap().method(), method);
        }
    }
}
