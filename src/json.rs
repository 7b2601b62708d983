use std::collections::HashMap;

use cgmath::{InnerSpace, Matrix, SquareMatrix, Zero};
use tinyjson::JsonValue;

use crate::{
    Error, deg2rad,
    transform::look_at_matrix,
    vec::{Mat4, Vec2u, Vec3, Vec4},
};

pub fn json_to_f64(json: &HashMap<String, JsonValue>, name: &str, default: f64) -> f64 {
    if !json.contains_key(name) {
        return default;
    }

    let json_val = &json[name];
    match json_val {
        JsonValue::Number(v) => *v,
        _ => default,
    }
}

pub fn json_to_string(json: &HashMap<String, JsonValue>, name: &str, default: &str) -> String {
    if !json.contains_key(name) {
        return default.to_string();
    }

    let json_val = &json[name];
    match json_val {
        JsonValue::String(v) => v.clone(),
        _ => default.to_string(),
    }
}

/// Sub-object `name`, or an empty object if absent
pub fn json_to_object(
    json: &HashMap<String, JsonValue>,
    name: &'static str,
) -> crate::Result<HashMap<String, JsonValue>> {
    match json.get(name) {
        None => Ok(HashMap::new()),
        Some(JsonValue::Object(v)) => Ok(v.clone()),
        Some(v) => Err(Error::UncoveredCaseJson(name, v.clone())),
    }
}

/// Read every entry of a JSON array as a number
fn json_numbers(name: &'static str, values: &[JsonValue]) -> crate::Result<Vec<f64>> {
    values
        .iter()
        .map(|v| match v {
            JsonValue::Number(v) => Ok(*v),
            _ => Err(Error::UncoveredCaseJson(name, v.clone())),
        })
        .collect()
}

struct JsonVec3(Vec3);
impl TryFrom<JsonValue> for JsonVec3 {
    type Error = crate::Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Number(v) => Ok(Self(Vec3::new(v, v, v))),
            JsonValue::Array(v) => {
                if v.len() == 3 {
                    let v = json_numbers("vec3", &v)?;
                    Ok(Self(Vec3::new(v[0], v[1], v[2])))
                } else {
                    Err(Error::WrongDimensionJson("vec3", v, 3))
                }
            }
            _ => Err(Error::UncoveredCaseJson("vec3", value)),
        }
    }
}

struct JsonVec2u(Vec2u);
impl TryFrom<JsonValue> for JsonVec2u {
    type Error = crate::Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Number(v) => {
                let v = v.max(0.0) as u32;
                Ok(Self(Vec2u::new(v, v)))
            }
            JsonValue::Array(v) => {
                if v.len() == 2 {
                    let v = json_numbers("vec2u", &v)?;
                    Ok(Self(Vec2u::new(v[0].max(0.0) as u32, v[1].max(0.0) as u32)))
                } else {
                    Err(Error::WrongDimensionJson("vec2u", v, 2))
                }
            }
            _ => Err(Error::UncoveredCaseJson("vec2u", value)),
        }
    }
}

pub fn json_to_vec3(json: &HashMap<String, JsonValue>, name: &str, default: Vec3) -> Vec3 {
    if !json.contains_key(name) {
        return default;
    }

    let json_val = json[name].clone();
    match TryInto::<JsonVec3>::try_into(json_val) {
        Err(_) => default,
        Ok(v) => v.0,
    }
}

pub fn json_to_vec2u(json: &HashMap<String, JsonValue>, name: &str, default: Vec2u) -> Vec2u {
    if !json.contains_key(name) {
        return default;
    }

    let json_val = json[name].clone();
    match TryInto::<JsonVec2u>::try_into(json_val) {
        Err(_) => default,
        Ok(v) => v.0,
    }
}

fn json_to_mat4_single(json: &HashMap<String, JsonValue>) -> crate::Result<Mat4> {
    if json.contains_key("from")
        || json.contains_key("to")
        || json.contains_key("up")
        || json.contains_key("at")
    {
        let from = json_to_vec3(json, "from", Vec3::new(0.0, 0.0, 1.0));
        let to = json_to_vec3(json, "to", Vec3::new(0.0, 0.0, 0.0));
        let to = to + json_to_vec3(json, "at", Vec3::new(0.0, 0.0, 0.0));
        let up = json_to_vec3(json, "up", Vec3::new(0.0, 1.0, 0.0));
        Ok(look_at_matrix(from, to, up))
    } else if json.contains_key("o")
        || json.contains_key("x")
        || json.contains_key("y")
        || json.contains_key("z")
    {
        let o = json_to_vec3(json, "o", Vec3::zero());
        let x = json_to_vec3(json, "x", Vec3::new(1.0, 0.0, 0.0));
        let y = json_to_vec3(json, "y", Vec3::new(0.0, 1.0, 0.0));
        let z = json_to_vec3(json, "z", Vec3::new(0.0, 0.0, 1.0));
        Ok(Mat4::from_cols(
            Vec4::new(x.x, x.y, x.z, 0.0),
            Vec4::new(y.x, y.y, y.z, 0.0),
            Vec4::new(z.x, z.y, z.z, 0.0),
            Vec4::new(o.x, o.y, o.z, 1.0),
        ))
    } else if json.contains_key("translate") {
        let t = json_to_vec3(json, "translate", Vec3::zero());
        Ok(Mat4::from_translation(t))
    } else if json.contains_key("scale") {
        let value = json_to_vec3(json, "scale", Vec3::zero());
        Ok(Mat4::from_diagonal(Vec4::new(
            value.x, value.y, value.z, 1.0,
        )))
    } else if json.contains_key("rotation") {
        // YXZ
        let r = json_to_vec3(json, "rotation", Vec3::zero());
        let r = r * crate::constants::M_PI / 180.0;
        let c = Vec3::new(r.x.cos(), r.y.cos(), r.z.cos());
        let s = Vec3::new(r.x.sin(), r.y.sin(), r.z.sin());

        Ok(Mat4::from_cols(
            Vec4::new(
                c[1] * c[2] - s[1] * s[0] * s[2],
                -c[1] * s[2] - s[1] * s[0] * c[2],
                -s[1] * c[0],
                0.0,
            ),
            Vec4::new(c[0] * s[2], c[0] * c[2], -s[0], 0.0),
            Vec4::new(
                s[1] * c[2] + c[1] * s[0] * s[2],
                -s[1] * s[2] + c[1] * s[0] * c[2],
                c[1] * c[0],
                0.0,
            ),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        )
        .transpose())
    } else if json.contains_key("axis") || json.contains_key("angle") {
        let angle = deg2rad(json_to_f64(json, "angle", 0.0));
        let axis = json_to_vec3(json, "axis", Vec3::new(1.0, 0.0, 0.0));
        Ok(Mat4::from_axis_angle(axis.normalize(), cgmath::Rad(angle)))
    } else if json.contains_key("matrix") {
        let values = match &json["matrix"] {
            JsonValue::Array(values) => values,
            v => return Err(Error::UncoveredCaseJson("mat4", v.clone())),
        };
        if values.len() != 16 {
            return Err(Error::WrongDimensionJson("mat4", values.clone(), 16));
        }
        let m = json_numbers("mat4", values)?;
        Ok(Mat4::new(
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8], m[9], m[10], m[11], m[12], m[13],
            m[14], m[15],
        )
        .transpose())
    } else {
        Err(Error::UncoveredCase("mat4", json.clone()))
    }
}

struct JsonMat4(Mat4);
impl TryFrom<JsonValue> for JsonMat4 {
    type Error = crate::Error;

    fn try_from(json: JsonValue) -> crate::Result<Self> {
        match json {
            JsonValue::Object(json) => {
                let m = json_to_mat4_single(&json)?;
                Ok(Self(m))
            }
            JsonValue::Array(vs) => {
                // each entry is applied after the previous ones
                let mut m = Mat4::identity();
                for v in vs {
                    let mv: HashMap<_, _> = v.try_into().map_err(|e| Error::Other(Box::new(e)))?;
                    m = json_to_mat4_single(&mv)? * m;
                }
                Ok(Self(m))
            }
            _ => Err(Error::UncoveredCaseJson("mat4", json)),
        }
    }
}

/// Read a transform, `None` if `name` is absent
pub fn json_to_mat4(json: &HashMap<String, JsonValue>, name: &str) -> crate::Result<Option<Mat4>> {
    json.get(name)
        .map(|v| JsonMat4::try_from(v.clone()).map(|m| m.0))
        .transpose()
}

// Merge two JSON
pub fn merge_json(
    json: &mut HashMap<String, JsonValue>,
    add: &HashMap<String, JsonValue>,
) -> crate::Result<()> {
    for (name, value) in add {
        // If the name is not found
        let Some(json_child) = json.get_mut(name) else {
            json.insert(name.clone(), value.clone());
            continue;
        };

        // Two case now:
        // 1) If the value is a object, no problem, we can call this function recursively
        // 2) Otherwise, we replace the value
        match (json_child, value) {
            (JsonValue::Object(child), JsonValue::Object(patch)) => merge_json(child, patch)?,
            (child, JsonValue::Object(_)) => {
                return Err(Error::FailedPatchJson(child.clone(), value.clone()));
            }
            (child, _) => *child = value.clone(),
        }
    }

    Ok(())
}
