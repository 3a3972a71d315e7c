// Lua 值與主控台型別之間的轉換

use mlua::prelude::*;

use crate::framebuffer::Texture;

/// 把 Lua 數值轉成整數；只接受整數或整數值的浮點數 (以及可轉換的數字字串)
pub fn to_integer(value: &LuaValue) -> Option<i64> {
    match value {
        LuaValue::Integer(n) => Some(*n),
        LuaValue::Number(n) => float_to_integer(*n),
        LuaValue::String(s) => {
            let text = s.to_str().ok()?;
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(float_to_integer))
        }
        _ => None,
    }
}

fn float_to_integer(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

pub fn to_number(value: &LuaValue) -> Option<f64> {
    match value {
        LuaValue::Integer(n) => Some(*n as f64),
        LuaValue::Number(n) => Some(*n),
        LuaValue::String(s) => s.to_str().ok()?.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// nil 與 false 之外皆為真
pub fn to_boolean(value: &LuaValue) -> bool {
    !matches!(value, LuaValue::Nil | LuaValue::Boolean(false))
}

/// 帶函式名稱的參數列表，錯誤訊息仿照 Lua 的 "bad argument"
pub struct Args {
    name: &'static str,
    values: Vec<LuaValue>,
}

impl Args {
    pub fn new(name: &'static str, values: LuaMultiValue) -> Self {
        Self {
            name,
            values: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get(&self, i: usize) -> LuaValue {
        self.values.get(i).cloned().unwrap_or(LuaValue::Nil)
    }

    fn bad_argument(&self, i: usize, expected: &str) -> LuaError {
        let got = match self.values.get(i) {
            Some(value) => value.type_name(),
            None => "no value",
        };
        LuaError::runtime(format!(
            "bad argument #{} to '{}' ({} expected, got {})",
            i + 1,
            self.name,
            expected,
            got
        ))
    }

    pub fn integer(&self, i: usize) -> LuaResult<i64> {
        to_integer(&self.get(i)).ok_or_else(|| self.bad_argument(i, "integer"))
    }

    pub fn number(&self, i: usize) -> LuaResult<f64> {
        to_number(&self.get(i)).ok_or_else(|| self.bad_argument(i, "number"))
    }

    pub fn boolean(&self, i: usize) -> bool {
        to_boolean(&self.get(i))
    }

    pub fn string(&self, i: usize) -> LuaResult<String> {
        match self.get(i) {
            LuaValue::String(s) => Ok(s.to_str()?.to_string()),
            LuaValue::Integer(n) => Ok(n.to_string()),
            LuaValue::Number(n) => Ok(n.to_string()),
            _ => Err(self.bad_argument(i, "string")),
        }
    }

    pub fn table(&self, i: usize) -> LuaResult<LuaTable> {
        match self.get(i) {
            LuaValue::Table(t) => Ok(t),
            _ => Err(self.bad_argument(i, "table")),
        }
    }

    pub fn function(&self, i: usize) -> LuaResult<LuaFunction> {
        match self.get(i) {
            LuaValue::Function(f) => Ok(f),
            _ => Err(self.bad_argument(i, "function")),
        }
    }
}

/// 材質 → 以 1 為起點的二維 Lua 表 (t[y][x])
pub fn texture_to_table(lua: &Lua, texture: &Texture) -> LuaResult<LuaTable> {
    let rows = lua.create_table_with_capacity(texture.height(), 0)?;
    for (y, row) in texture.rows().into_iter().enumerate() {
        let line = lua.create_table_with_capacity(row.len(), 0)?;
        for (x, code) in row.into_iter().enumerate() {
            line.raw_set(x + 1, code)?;
        }
        rows.raw_set(y + 1, line)?;
    }
    Ok(rows)
}

/// 二維 Lua 表 → 材質；非整數的元素視為 0 (略過)
pub fn table_to_texture(table: &LuaTable) -> LuaResult<Texture> {
    let height = table.raw_len();
    let mut rows = Vec::with_capacity(height);
    for y in 1..=height {
        let row = match table.raw_get::<LuaValue>(y)? {
            LuaValue::Table(row) => {
                let width = row.raw_len();
                let mut codes = Vec::with_capacity(width);
                for x in 1..=width {
                    let value = row.raw_get::<LuaValue>(x)?;
                    codes.push(to_integer(&value).unwrap_or(0));
                }
                codes
            }
            _ => Vec::new(),
        };
        rows.push(row);
    }
    Ok(Texture::from_rows(&rows))
}
