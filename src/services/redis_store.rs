// src/services/redis_store.rs
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, Script, Value};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{
    errors::{TaxiError, TaxiResult},
    models::{Car, Driver, Manufacturer, Session},
    services::store::FleetStore,
};

pub const DEFAULT_KEY_PREFIX: &str = "taxi:";

// Every script takes the key prefix as ARGV[1] and returns either a
// `{status, subject}` pair or a number. The layout they build matches
// `StoreKeys`.

const SAVE_MANUFACTURER: &str = r#"
local prefix, mode, id, record, name = ARGV[1], ARGV[2], ARGV[3], ARGV[4], ARGV[5]
local key = prefix .. 'manufacturer:' .. id
local existing = redis.call('GET', key)
if mode == 'insert' and existing then return {'id_taken', id} end
if mode == 'update' and not existing then return {'manufacturer_missing', id} end
local name_key = prefix .. 'manufacturer_name:' .. name
local owner = redis.call('GET', name_key)
if owner and owner ~= id then return {'name_taken', name} end
if existing then
  local previous = cjson.decode(existing)['name']
  if previous ~= name then redis.call('DEL', prefix .. 'manufacturer_name:' .. previous) end
end
redis.call('SET', key, record)
redis.call('SET', name_key, id)
redis.call('SADD', prefix .. 'manufacturers', id)
return {'ok', id}
"#;

const DELETE_MANUFACTURER: &str = r#"
local prefix, id = ARGV[1], ARGV[2]
local key = prefix .. 'manufacturer:' .. id
local existing = redis.call('GET', key)
if not existing then return -1 end
local cars_key = key .. ':cars'
local car_ids = redis.call('SMEMBERS', cars_key)
for _, car_id in ipairs(car_ids) do
  local car_key = prefix .. 'car:' .. car_id
  local drivers_key = car_key .. ':drivers'
  for _, driver_id in ipairs(redis.call('SMEMBERS', drivers_key)) do
    redis.call('SREM', prefix .. 'driver:' .. driver_id .. ':cars', car_id)
  end
  redis.call('DEL', car_key, drivers_key)
  redis.call('SREM', prefix .. 'cars', car_id)
end
redis.call('DEL', key, cars_key, prefix .. 'manufacturer_name:' .. cjson.decode(existing)['name'])
redis.call('SREM', prefix .. 'manufacturers', id)
return #car_ids
"#;

const SAVE_DRIVER: &str = r#"
local prefix, mode, id, record, username, license = ARGV[1], ARGV[2], ARGV[3], ARGV[4], ARGV[5], ARGV[6]
local key = prefix .. 'driver:' .. id
local existing = redis.call('GET', key)
if mode == 'insert' and existing then return {'id_taken', id} end
if mode == 'update' and not existing then return {'driver_missing', id} end
local username_key = prefix .. 'driver_username:' .. username
local owner = redis.call('GET', username_key)
if owner and owner ~= id then return {'username_taken', username} end
local license_key = prefix .. 'driver_license:' .. license
if license ~= '' then
  local license_owner = redis.call('GET', license_key)
  if license_owner and license_owner ~= id then return {'license_taken', license} end
end
if existing then
  local previous = cjson.decode(existing)
  if previous['username'] ~= username then
    redis.call('DEL', prefix .. 'driver_username:' .. previous['username'])
  end
  local previous_license = previous['license_number']
  if type(previous_license) == 'string' and previous_license ~= license then
    redis.call('DEL', prefix .. 'driver_license:' .. previous_license)
  end
end
redis.call('SET', key, record)
redis.call('SET', username_key, id)
if license ~= '' then redis.call('SET', license_key, id) end
redis.call('SADD', prefix .. 'drivers', id)
return {'ok', id}
"#;

const DELETE_DRIVER: &str = r#"
local prefix, id = ARGV[1], ARGV[2]
local key = prefix .. 'driver:' .. id
local existing = redis.call('GET', key)
if not existing then return 0 end
local driver = cjson.decode(existing)
local cars_key = key .. ':cars'
for _, car_id in ipairs(redis.call('SMEMBERS', cars_key)) do
  redis.call('SREM', prefix .. 'car:' .. car_id .. ':drivers', id)
end
redis.call('DEL', key, cars_key, prefix .. 'driver_username:' .. driver['username'])
if type(driver['license_number']) == 'string' then
  redis.call('DEL', prefix .. 'driver_license:' .. driver['license_number'])
end
redis.call('SREM', prefix .. 'drivers', id)
return 1
"#;

// ARGV[6..] are the car's driver ids.
const SAVE_CAR: &str = r#"
local prefix, mode, id, record, manufacturer_id = ARGV[1], ARGV[2], ARGV[3], ARGV[4], ARGV[5]
local key = prefix .. 'car:' .. id
local existing = redis.call('GET', key)
if mode == 'insert' and existing then return {'id_taken', id} end
if mode == 'update' and not existing then return {'car_missing', id} end
if redis.call('EXISTS', prefix .. 'manufacturer:' .. manufacturer_id) == 0 then
  return {'manufacturer_missing', manufacturer_id}
end
for i = 6, #ARGV do
  if redis.call('EXISTS', prefix .. 'driver:' .. ARGV[i]) == 0 then return {'driver_missing', ARGV[i]} end
end
local drivers_key = key .. ':drivers'
if existing then
  local previous = cjson.decode(existing)['manufacturer_id']
  redis.call('SREM', prefix .. 'manufacturer:' .. previous .. ':cars', id)
  for _, driver_id in ipairs(redis.call('SMEMBERS', drivers_key)) do
    redis.call('SREM', prefix .. 'driver:' .. driver_id .. ':cars', id)
  end
  redis.call('DEL', drivers_key)
end
redis.call('SET', key, record)
redis.call('SADD', prefix .. 'cars', id)
redis.call('SADD', prefix .. 'manufacturer:' .. manufacturer_id .. ':cars', id)
for i = 6, #ARGV do
  redis.call('SADD', drivers_key, ARGV[i])
  redis.call('SADD', prefix .. 'driver:' .. ARGV[i] .. ':cars', id)
end
return {'ok', id}
"#;

const DELETE_CAR: &str = r#"
local prefix, id = ARGV[1], ARGV[2]
local key = prefix .. 'car:' .. id
local existing = redis.call('GET', key)
if not existing then return 0 end
local drivers_key = key .. ':drivers'
for _, driver_id in ipairs(redis.call('SMEMBERS', drivers_key)) do
  redis.call('SREM', prefix .. 'driver:' .. driver_id .. ':cars', id)
end
local manufacturer_id = cjson.decode(existing)['manufacturer_id']
redis.call('SREM', prefix .. 'manufacturer:' .. manufacturer_id .. ':cars', id)
redis.call('DEL', key, drivers_key)
redis.call('SREM', prefix .. 'cars', id)
return 1
"#;

const RECORD_VISIT: &str = r#"
local key = ARGV[1] .. 'session:' .. ARGV[2]
local raw = redis.call('GET', key)
if not raw then return false end
local session = cjson.decode(raw)
session['num_visits'] = session['num_visits'] + 1
redis.call('SET', key, cjson.encode(session), 'KEEPTTL')
return session['num_visits']
"#;

static SAVE_MANUFACTURER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(SAVE_MANUFACTURER));
static DELETE_MANUFACTURER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DELETE_MANUFACTURER));
static SAVE_DRIVER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(SAVE_DRIVER));
static DELETE_DRIVER_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DELETE_DRIVER));
static SAVE_CAR_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(SAVE_CAR));
static DELETE_CAR_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(DELETE_CAR));
static RECORD_VISIT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(RECORD_VISIT));

// Key layout
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn manufacturer(&self, id: &str) -> String {
        format!("{}manufacturer:{}", self.prefix, id)
    }

    pub fn manufacturers(&self) -> String {
        format!("{}manufacturers", self.prefix)
    }

    pub fn driver(&self, id: &str) -> String {
        format!("{}driver:{}", self.prefix, id)
    }

    pub fn drivers(&self) -> String {
        format!("{}drivers", self.prefix)
    }

    pub fn driver_username(&self, username: &str) -> String {
        format!("{}driver_username:{}", self.prefix, username)
    }

    pub fn car(&self, id: &str) -> String {
        format!("{}car:{}", self.prefix, id)
    }

    pub fn car_drivers(&self, id: &str) -> String {
        format!("{}car:{}:drivers", self.prefix, id)
    }

    pub fn cars(&self) -> String {
        format!("{}cars", self.prefix)
    }

    pub fn session(&self, token: &str) -> String {
        format!("{}session:{}", self.prefix, token)
    }
}

/// Car as stored; driver ids live in their own set.
#[derive(Debug, Serialize, Deserialize)]
struct CarRecord {
    id: String,
    model: String,
    manufacturer_id: String,
}

impl CarRecord {
    fn from_car(car: &Car) -> Self {
        Self {
            id: car.id.clone(),
            model: car.model.clone(),
            manufacturer_id: car.manufacturer_id.clone(),
        }
    }

    fn into_car(self, driver_ids: Vec<String>) -> Car {
        Car {
            id: self.id,
            model: self.model,
            manufacturer_id: self.manufacturer_id,
            driver_ids: driver_ids.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Insert,
    Update,
}

impl WriteMode {
    fn as_str(self) -> &'static str {
        match self {
            WriteMode::Insert => "insert",
            WriteMode::Update => "update",
        }
    }
}

/// Maps a write script's `{status, subject}` reply onto the store's errors.
fn script_outcome((status, subject): (String, String)) -> TaxiResult<()> {
    match status.as_str() {
        "ok" => Ok(()),
        "id_taken" => Err(TaxiError::conflict(format!("Id already used: {}", subject))),
        "name_taken" => Err(TaxiError::conflict(format!("Manufacturer with name '{}' already exists", subject))),
        "username_taken" => Err(TaxiError::conflict(format!("Driver with username '{}' already exists", subject))),
        "license_taken" => Err(TaxiError::conflict("Driver with this license number already exists")),
        "manufacturer_missing" => Err(TaxiError::manufacturer_not_found(subject)),
        "driver_missing" => Err(TaxiError::driver_not_found(subject)),
        "car_missing" => Err(TaxiError::car_not_found(subject)),
        other => Err(TaxiError::StoreQuery(format!("Unexpected script status '{}' for {}", other, subject))),
    }
}

/// Redis backend. Records are JSON strings; id sets and unique-value
/// index keys stand in for tables and constraints. Every write that
/// touches more than one key runs as a Lua script, so its checks and
/// writes are one atomic step.
pub struct RedisStore {
    connection: MultiplexedConnection,
    keys: StoreKeys,
    prefix: String,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> TaxiResult<Self> {
        Self::connect_with_prefix(redis_url, DEFAULT_KEY_PREFIX).await
    }

    pub async fn connect_with_prefix(redis_url: &str, prefix: &str) -> TaxiResult<Self> {
        let client = Client::open(redis_url).map_err(|e| TaxiError::StoreConnection(e.to_string()))?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        tracing::info!("Connected to Redis store (prefix '{}')", prefix);
        Ok(Self {
            connection,
            keys: StoreKeys::new(prefix),
            prefix: prefix.to_string(),
        })
    }

    fn conn(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> TaxiResult<Option<T>> {
        let raw: Option<String> = self.conn().get(key).await?;
        Ok(raw.map(|json| serde_json::from_str(&json)).transpose()?)
    }

    async fn get_all<T: DeserializeOwned>(&self, set_key: &str, record_key: impl Fn(&str) -> String) -> TaxiResult<Vec<T>> {
        let mut conn = self.conn();
        let ids: Vec<String> = conn.smembers(set_key).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids.iter().map(|id| record_key(id)).collect();
        let raw: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;
        raw.into_iter()
            .flatten()
            .map(|json| serde_json::from_str(&json).map_err(TaxiError::from))
            .collect()
    }

    /// Loads cars with their driver sets in one MULTI/EXEC; ids deleted
    /// since they were listed are skipped.
    async fn load_cars(&self, ids: &[String]) -> TaxiResult<Vec<Car>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for id in ids {
            pipe.get(self.keys.car(id)).smembers(self.keys.car_drivers(id));
        }
        let replies: Vec<Value> = pipe.query_async(&mut self.conn()).await?;

        let mut cars = Vec::with_capacity(ids.len());
        for pair in replies.chunks(2) {
            let [record, drivers] = pair else {
                return Err(TaxiError::StoreQuery("Incomplete car reply".to_string()));
            };
            let record: Option<String> = redis::from_redis_value(record)?;
            let driver_ids: Vec<String> = redis::from_redis_value(drivers)?;
            if let Some(record) = record {
                cars.push(serde_json::from_str::<CarRecord>(&record)?.into_car(driver_ids));
            }
        }
        Ok(cars)
    }

    async fn save_manufacturer(&self, mode: WriteMode, manufacturer: &Manufacturer) -> TaxiResult<()> {
        let mut invocation = SAVE_MANUFACTURER_SCRIPT.prepare_invoke();
        invocation
            .arg(&self.prefix)
            .arg(mode.as_str())
            .arg(&manufacturer.id)
            .arg(serde_json::to_string(manufacturer)?)
            .arg(&manufacturer.name);
        script_outcome(invocation.invoke_async(&mut self.conn()).await?)
    }

    async fn save_driver(&self, mode: WriteMode, driver: &Driver) -> TaxiResult<()> {
        let mut invocation = SAVE_DRIVER_SCRIPT.prepare_invoke();
        invocation
            .arg(&self.prefix)
            .arg(mode.as_str())
            .arg(&driver.id)
            .arg(serde_json::to_string(driver)?)
            .arg(&driver.username)
            .arg(driver.license_number.as_deref().unwrap_or(""));
        script_outcome(invocation.invoke_async(&mut self.conn()).await?)
    }

    async fn save_car(&self, mode: WriteMode, car: &Car) -> TaxiResult<()> {
        let mut invocation = SAVE_CAR_SCRIPT.prepare_invoke();
        invocation
            .arg(&self.prefix)
            .arg(mode.as_str())
            .arg(&car.id)
            .arg(serde_json::to_string(&CarRecord::from_car(car))?)
            .arg(&car.manufacturer_id);
        for driver_id in &car.driver_ids {
            invocation.arg(driver_id);
        }
        script_outcome(invocation.invoke_async(&mut self.conn()).await?)
    }

    async fn delete_by_script(&self, script: &Script, id: &str) -> TaxiResult<i64> {
        let mut invocation = script.prepare_invoke();
        invocation.arg(&self.prefix).arg(id);
        Ok(invocation.invoke_async(&mut self.conn()).await?)
    }
}

#[async_trait]
impl FleetStore for RedisStore {
    async fn insert_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()> {
        self.save_manufacturer(WriteMode::Insert, manufacturer).await
    }

    async fn update_manufacturer(&self, manufacturer: &Manufacturer) -> TaxiResult<()> {
        self.save_manufacturer(WriteMode::Update, manufacturer).await
    }

    async fn get_manufacturer(&self, id: &str) -> TaxiResult<Option<Manufacturer>> {
        self.get_json(&self.keys.manufacturer(id)).await
    }

    async fn list_manufacturers(&self) -> TaxiResult<Vec<Manufacturer>> {
        self.get_all(&self.keys.manufacturers(), |id| self.keys.manufacturer(id)).await
    }

    async fn delete_manufacturer(&self, id: &str) -> TaxiResult<bool> {
        let removed_cars = self.delete_by_script(&DELETE_MANUFACTURER_SCRIPT, id).await?;
        if removed_cars < 0 {
            return Ok(false);
        }
        tracing::debug!("Manufacturer {} deleted with {} cars", id, removed_cars);
        Ok(true)
    }

    async fn count_manufacturers(&self) -> TaxiResult<usize> {
        Ok(self.conn().scard(self.keys.manufacturers()).await?)
    }

    async fn insert_driver(&self, driver: &Driver) -> TaxiResult<()> {
        self.save_driver(WriteMode::Insert, driver).await
    }

    async fn update_driver(&self, driver: &Driver) -> TaxiResult<()> {
        self.save_driver(WriteMode::Update, driver).await
    }

    async fn get_driver(&self, id: &str) -> TaxiResult<Option<Driver>> {
        self.get_json(&self.keys.driver(id)).await
    }

    async fn get_driver_by_username(&self, username: &str) -> TaxiResult<Option<Driver>> {
        let id: Option<String> = self.conn().get(self.keys.driver_username(username)).await?;
        match id {
            Some(id) => self.get_driver(&id).await,
            None => Ok(None),
        }
    }

    async fn list_drivers(&self) -> TaxiResult<Vec<Driver>> {
        self.get_all(&self.keys.drivers(), |id| self.keys.driver(id)).await
    }

    async fn delete_driver(&self, id: &str) -> TaxiResult<bool> {
        Ok(self.delete_by_script(&DELETE_DRIVER_SCRIPT, id).await? == 1)
    }

    async fn count_drivers(&self) -> TaxiResult<usize> {
        Ok(self.conn().scard(self.keys.drivers()).await?)
    }

    async fn insert_car(&self, car: &Car) -> TaxiResult<()> {
        self.save_car(WriteMode::Insert, car).await
    }

    async fn update_car(&self, car: &Car) -> TaxiResult<()> {
        self.save_car(WriteMode::Update, car).await
    }

    async fn get_car(&self, id: &str) -> TaxiResult<Option<Car>> {
        Ok(self.load_cars(&[id.to_string()]).await?.pop())
    }

    async fn list_cars(&self) -> TaxiResult<Vec<Car>> {
        let ids: Vec<String> = self.conn().smembers(self.keys.cars()).await?;
        self.load_cars(&ids).await
    }

    async fn delete_car(&self, id: &str) -> TaxiResult<bool> {
        Ok(self.delete_by_script(&DELETE_CAR_SCRIPT, id).await? == 1)
    }

    async fn count_cars(&self) -> TaxiResult<usize> {
        Ok(self.conn().scard(self.keys.cars()).await?)
    }

    async fn save_session(&self, session: &Session) -> TaxiResult<()> {
        let ttl = session.remaining_seconds();
        if ttl == 0 {
            return self.delete_session(&session.token).await;
        }
        redis::cmd("SETEX")
            .arg(self.keys.session(&session.token))
            .arg(ttl)
            .arg(serde_json::to_string(session)?)
            .query_async::<_, ()>(&mut self.conn())
            .await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> TaxiResult<Option<Session>> {
        self.get_json(&self.keys.session(token)).await
    }

    async fn record_visit(&self, token: &str) -> TaxiResult<Option<u64>> {
        let mut invocation = RECORD_VISIT_SCRIPT.prepare_invoke();
        invocation.arg(&self.prefix).arg(token);
        Ok(invocation.invoke_async(&mut self.conn()).await?)
    }

    async fn delete_session(&self, token: &str) -> TaxiResult<()> {
        let _: () = self.conn().del(self.keys.session(token)).await?;
        Ok(())
    }
}
