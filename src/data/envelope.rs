use crate::data::enumeration::EnumString;
use crate::data::{ApiError, Request, RequestType, Response, ResponseType};
use crate::error::{Error, ErrorKind, UnexpectedResponseError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::borrow::Cow;
use std::fmt;

/// The fixed `apiName` value in requests and responses.
pub const API_NAME: &str = "VTubeStudioPublicAPI";

/// The fixed `apiVersion` value in requests and responses.
pub const API_VERSION: &str = "1.0";

/// Request ID used in [`RequestEnvelope`] and [`ResponseEnvelope`].
///
/// A correlation label chosen by the caller. Since only one request may be
/// outstanding per connection, it does not need to be unique across calls.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestId(smol_str::SmolStr);

impl RequestId {
    /// Creates a new [`RequestId`].
    pub fn new(value: String) -> Self {
        Self(value.into())
    }

    /// Returns the string representation of the request ID.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Consumes this value and returns the inner `String` representation.
    pub fn into_string(self) -> String {
        String::from(self.0)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arbitrary JSON data used in [`RequestEnvelope`] and [`ResponseEnvelope`].
#[derive(Default, Clone, Debug, Serialize, Deserialize)]
pub struct OpaqueValue(Box<RawValue>);

// This is an expensive operation so it's only enabled in tests
#[cfg(test)]
impl PartialEq for OpaqueValue {
    fn eq(&self, rhs: &Self) -> bool {
        let left = self.deserialize::<serde_json::Value>();
        let right = rhs.deserialize::<serde_json::Value>();

        matches!((left, right), (Ok(a), Ok(b)) if a == b)
    }
}

impl OpaqueValue {
    /// Creates a new instance from a serializable value.
    pub fn new<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self(serde_json::value::to_raw_value(value)?))
    }

    /// Deserializes the value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.0.get())
    }
}

/// A VTube Studio API request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// API name, typically `"VTubeStudioPublicAPI"`.
    pub api_name: Cow<'static, str>,
    /// API version, typically `"1.0"`.
    pub api_version: Cow<'static, str>,
    /// The caller-chosen correlation label.
    #[serde(rename = "requestID", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    /// The request type.
    pub message_type: EnumString<RequestType>,
    /// The request data.
    pub data: OpaqueValue,
}

impl Default for RequestEnvelope {
    fn default() -> Self {
        Self {
            api_name: Cow::Borrowed(API_NAME),
            api_version: Cow::Borrowed(API_VERSION),
            request_id: None,
            message_type: EnumString::default(),
            data: OpaqueValue::default(),
        }
    }
}

impl RequestEnvelope {
    /// Creates a request with the underlying typed data.
    pub fn new<Req: Request>(data: &Req) -> Result<Self, serde_json::Error> {
        let mut value = Self::default();
        value.set_data(data)?;
        Ok(value)
    }

    /// Sets the `data` field of a request.
    pub fn set_data<Req: Request>(&mut self, data: &Req) -> Result<(), serde_json::Error> {
        self.message_type = Req::MESSAGE_TYPE;
        self.data = OpaqueValue::new(data)?;
        Ok(())
    }

    /// Sets the request ID.
    pub fn with_id<T: Into<Option<RequestId>>>(mut self, id: T) -> Self {
        self.request_id = id.into();
        self
    }
}

/// A VTube Studio API response.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ResponseEnvelope {
    /// API name, typically `"VTubeStudioPublicAPI"`.
    pub api_name: Cow<'static, str>,
    /// API version, typically `"1.0"`.
    pub api_version: Cow<'static, str>,
    /// Unix timestamp (in milliseconds) of the response, when provided.
    pub timestamp: i64,
    /// The original request ID.
    pub request_id: RequestId,
    /// Response data, which could be an [`ApiError`].
    pub data: Result<ResponseData, ApiError>,
}

const API_ERROR_MESSAGE_TYPE: &EnumString<ResponseType> =
    &EnumString::new(ResponseType::ApiError);

impl ResponseEnvelope {
    /// Creates a new response with the underlying typed data.
    pub fn new<Resp>(data: &Resp) -> Result<Self, serde_json::Error>
    where
        Resp: Response + Serialize,
    {
        let mut value = Self::default();
        value.set_data(data)?;
        Ok(value)
    }

    /// Sets the request ID.
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.request_id = id;
        self
    }

    /// Sets the `data` field of a response.
    pub fn set_data<Resp>(&mut self, data: &Resp) -> Result<(), serde_json::Error>
    where
        Resp: Response + Serialize,
    {
        self.data = Ok(ResponseData {
            message_type: Resp::MESSAGE_TYPE,
            data: OpaqueValue::new(data)?,
        });
        Ok(())
    }

    /// The message type of this response.
    pub fn message_type(&self) -> &EnumString<ResponseType> {
        match &self.data {
            Ok(data) => &data.message_type,
            Err(_) => API_ERROR_MESSAGE_TYPE,
        }
    }

    /// Attempts to parse the response into the given [`Response`] type.
    ///
    /// Returns an [`Api`](ErrorKind::Api) error if the message is an
    /// `APIError`, and a [`Protocol`](ErrorKind::Protocol) error if the message
    /// type is unexpected or its data is missing expected fields.
    pub fn parse<Resp: Response>(self) -> Result<Resp, Error> {
        let data = self.data?;

        if data.message_type == Resp::MESSAGE_TYPE {
            data.data
                .deserialize()
                .map_err(|e| Error::new(ErrorKind::Protocol).with_source(e))
        } else {
            Err(UnexpectedResponseError {
                expected: Resp::MESSAGE_TYPE.as_str().to_owned(),
                received: data.message_type.as_str().to_owned(),
            }
            .into())
        }
    }

    /// Returns `true` if the message type is `APIError`.
    pub fn is_api_error(&self) -> bool {
        self.data.is_err()
    }

    /// Returns `true` if the message is an `APIError` with
    /// [`ErrorId::REQUEST_REQUIRES_AUTHENTICATION`](crate::data::ErrorId).
    pub fn is_unauthenticated_error(&self) -> bool {
        matches!(&self.data, Err(e) if e.is_unauthenticated())
    }
}

/// Response data wrapper for [`ResponseEnvelope`] (typically for non-error responses).
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ResponseData {
    /// The message type.
    pub message_type: EnumString<ResponseType>,
    /// The raw data.
    pub data: OpaqueValue,
}

// Reuse the static constants for the typical envelope values.
fn intern(value: String, known: &'static str) -> Cow<'static, str> {
    if value == known {
        Cow::Borrowed(known)
    } else {
        Cow::Owned(value)
    }
}

// Custom deserialize, to eagerly parse API errors.
impl<'de> Deserialize<'de> for ResponseEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawResponseEnvelope {
            api_name: String,
            api_version: String,
            #[serde(default)]
            timestamp: i64,
            #[serde(rename = "requestID")]
            request_id: RequestId,
            message_type: EnumString<ResponseType>,
            data: OpaqueValue,
        }

        let raw = RawResponseEnvelope::deserialize(deserializer)?;

        let data = if raw.message_type == ResponseType::ApiError {
            Err(raw.data.deserialize().map_err(serde::de::Error::custom)?)
        } else {
            Ok(ResponseData {
                message_type: raw.message_type,
                data: raw.data,
            })
        };

        Ok(Self {
            api_name: intern(raw.api_name, API_NAME),
            api_version: intern(raw.api_version, API_VERSION),
            timestamp: raw.timestamp,
            request_id: raw.request_id,
            data,
        })
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct RawResponseEnvelope<'a, T> {
            api_name: &'a str,
            api_version: &'a str,
            timestamp: i64,
            #[serde(rename = "requestID")]
            request_id: &'a RequestId,
            message_type: &'a EnumString<ResponseType>,
            data: &'a T,
        }

        match &self.data {
            Ok(inner) => RawResponseEnvelope {
                api_name: &self.api_name,
                api_version: &self.api_version,
                timestamp: self.timestamp,
                request_id: &self.request_id,
                message_type: &inner.message_type,
                data: &inner.data,
            }
            .serialize(serializer),
            Err(e) => RawResponseEnvelope {
                api_name: &self.api_name,
                api_version: &self.api_version,
                timestamp: self.timestamp,
                request_id: &self.request_id,
                message_type: API_ERROR_MESSAGE_TYPE,
                data: &e,
            }
            .serialize(serializer),
        }
    }
}

impl Default for ResponseEnvelope {
    fn default() -> Self {
        Self {
            api_name: Cow::Borrowed(API_NAME),
            api_version: Cow::Borrowed(API_VERSION),
            timestamp: 0,
            request_id: RequestId::default(),
            data: Ok(ResponseData {
                message_type: EnumString::const_new_from_str("UnknownResponse"),
                data: OpaqueValue::default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        AuthenticationTokenRequest, AuthenticationTokenResponse, AvailableModelsRequest,
        AvailableModelsResponse,
    };
    use crate::error::ErrorId;
    use serde_json::json;

    type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

    #[test]
    fn request() -> Result {
        let req = RequestEnvelope::new(&AvailableModelsRequest {})?
            .with_id(RequestId::from("MyIDWithLessThan64Characters"));

        let json = json!({
            "apiName": "VTubeStudioPublicAPI",
            "apiVersion": "1.0",
            "requestID": "MyIDWithLessThan64Characters",
            "messageType": "AvailableModelsRequest",
            "data": {}
        });

        assert_eq!(serde_json::to_value(&req)?, json);
        assert_eq!(serde_json::from_value::<RequestEnvelope>(json)?, req);

        Ok(())
    }

    #[test]
    fn request_without_id_skips_the_field() -> Result {
        let req = RequestEnvelope::new(&AuthenticationTokenRequest {
            plugin_name: "Plugin".into(),
            plugin_developer: "Developer".into(),
            plugin_icon: None,
        })?;

        let value = serde_json::to_value(&req)?;
        assert!(value.get("requestID").is_none());

        let data = req.data.deserialize::<serde_json::Value>()?;
        assert!(data.get("pluginIcon").is_none());

        Ok(())
    }

    #[test]
    fn response() -> Result {
        let json = json!({
            "apiName": "VTubeStudioPublicAPI",
            "apiVersion": "1.0",
            "timestamp": 1625405710728i64,
            "messageType": "AuthenticationTokenResponse",
            "requestID": "MyIDWithLessThan64Characters",
            "data": {
                "authenticationToken": "some-token"
            }
        });

        let resp = ResponseEnvelope {
            api_name: "VTubeStudioPublicAPI".into(),
            api_version: "1.0".into(),
            request_id: "MyIDWithLessThan64Characters".into(),
            timestamp: 1625405710728,
            data: Ok(ResponseData {
                message_type: AuthenticationTokenResponse::MESSAGE_TYPE,
                data: OpaqueValue::new(&AuthenticationTokenResponse {
                    authentication_token: "some-token".into(),
                })?,
            }),
        };

        assert_eq!(serde_json::to_value(&resp)?, json);
        assert_eq!(serde_json::from_value::<ResponseEnvelope>(json)?, resp);

        Ok(())
    }

    #[test]
    fn api_error_is_a_distinct_variant() -> Result {
        let json = json!({
            "apiName": "VTubeStudioPublicAPI",
            "apiVersion": "1.0",
            "timestamp": 1625405710728i64,
            "requestID": "SomeID",
            "messageType": "APIError",
            "data": {
                "errorID": 8,
                "message": "Not authenticated"
            }
        });

        let resp = serde_json::from_value::<ResponseEnvelope>(json)?;

        assert!(resp.is_api_error());
        assert!(resp.is_unauthenticated_error());
        assert_eq!(
            resp.data,
            Err(ApiError {
                error_id: ErrorId::REQUEST_REQUIRES_AUTHENTICATION,
                message: "Not authenticated".into(),
            })
        );

        Ok(())
    }

    #[test]
    fn parse_response() -> Result {
        let data = AvailableModelsResponse {
            number_of_models: 0,
            available_models: Vec::new(),
        };

        let resp = ResponseEnvelope::new(&data)?;
        let parsed = resp.parse::<AvailableModelsResponse>()?;

        assert_eq!(parsed, data);

        Ok(())
    }

    #[test]
    fn parse_wrong_message_type_is_a_protocol_error() -> Result {
        let resp = ResponseEnvelope::new(&AvailableModelsResponse::default())?;

        let error = resp
            .parse::<AuthenticationTokenResponse>()
            .expect_err("expected parse failure");

        assert_eq!(error.kind(), &crate::ErrorKind::Protocol);
        assert!(error.find_source::<UnexpectedResponseError>().is_some());

        Ok(())
    }

    #[test]
    fn parse_missing_field_is_a_protocol_error() -> Result {
        let json = json!({
            "apiName": "VTubeStudioPublicAPI",
            "apiVersion": "1.0",
            "timestamp": 0,
            "requestID": "requestToken",
            "messageType": "AuthenticationTokenResponse",
            "data": {}
        });

        let resp = serde_json::from_value::<ResponseEnvelope>(json)?;
        let error = resp
            .parse::<AuthenticationTokenResponse>()
            .expect_err("expected parse failure");

        assert_eq!(error.kind(), &crate::ErrorKind::Protocol);

        Ok(())
    }

    #[test]
    fn response_without_timestamp() -> Result {
        let json = json!({
            "apiName": "VTubeStudioPublicAPI",
            "apiVersion": "1.0",
            "requestID": "SomeID",
            "messageType": "MoveModelResponse",
            "data": {}
        });

        let resp = serde_json::from_value::<ResponseEnvelope>(json)?;
        assert_eq!(resp.timestamp, 0);

        Ok(())
    }
}
