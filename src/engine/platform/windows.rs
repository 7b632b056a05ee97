//! WMI backend driving COM through the `windows` crate
//!
//! Each pipeline step maps to one native call: `CoInitializeEx`,
//! `CoCreateInstance(WbemLocator)`, `QueryInterface(IWbemLocator)`,
//! `ConnectServer`, `ExecQuery` and `IEnumWbemClassObject::Next`. Property
//! values are marshalled with the `wmi` crate's variant conversion.

use std::marker::PhantomData;

use tracing::debug;
use windows::core::{IUnknown, Interface, BSTR};
use windows::Win32::Foundation::E_POINTER;
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoSetProxyBlanket, CoUninitialize, CLSCTX_INPROC_SERVER,
    COINIT_MULTITHREADED, EOAC_NONE, RPC_C_AUTHN_LEVEL_CALL, RPC_C_IMP_LEVEL_IMPERSONATE,
};
use windows::Win32::System::Rpc::{RPC_C_AUTHN_WINNT, RPC_C_AUTHZ_NONE};
use windows::Win32::System::Wmi::{
    IEnumWbemClassObject, IWbemLocator, IWbemServices, WbemLocator, WBEM_FLAG_FORWARD_ONLY,
    WBEM_FLAG_RETURN_IMMEDIATELY, WBEM_INFINITE,
};
use wmi::result_enumerator::IWbemClassWrapper;
use wmi::{Variant, WMIError};

use crate::engine::backend::{
    is_tolerated_init_status, Backend, BackendError, ConnectionArgs, NamedProperties, S_FALSE,
};
use crate::engine::platform::connect::ConnectServerArgs;
use crate::engine::value::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct WmiBackend;

/// COM initialized in the multi-threaded apartment for this thread.
///
/// Dropping it balances the successful `CoInitializeEx`, `S_FALSE` included.
pub struct ComRuntime {
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for ComRuntime {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
        debug!("COM runtime released");
    }
}

/// The `WbemLocator` instance as returned by `CoCreateInstance`
pub struct Locator {
    unknown: IUnknown,
}

pub struct Dispatch {
    locator: IWbemLocator,
}

pub struct Service {
    services: IWbemServices,
}

/// Forward-only results of `ExecQuery`, handed to the enumeration step once.
pub struct QueryResults {
    enumerator: Option<IEnumWbemClassObject>,
}

pub struct ResultEnumerator {
    inner: IEnumWbemClassObject,
}

pub struct ManagementObject {
    inner: IWbemClassWrapper,
}

fn native_error(err: windows::core::Error) -> BackendError {
    BackendError::with_code(err.code().0, err.message().to_string())
}

fn backend_error(err: WMIError) -> BackendError {
    match err {
        WMIError::HResultError { hres } => BackendError::with_code(hres, format!("HRESULT 0x{:08X}", hres as u32)),
        other => BackendError::new(other.to_string()),
    }
}

fn optional_bstr(value: Option<&str>) -> BSTR {
    value.map(BSTR::from).unwrap_or_default()
}

fn to_value(variant: Variant) -> Value {
    match variant {
        Variant::Empty | Variant::Null => Value::Null,
        Variant::String(s) => Value::String(s),
        Variant::I1(n) => Value::Int(n.into()),
        Variant::I2(n) => Value::Int(n.into()),
        Variant::I4(n) => Value::Int(n.into()),
        Variant::I8(n) => Value::Int(n),
        Variant::UI1(n) => Value::UInt(n.into()),
        Variant::UI2(n) => Value::UInt(n.into()),
        Variant::UI4(n) => Value::UInt(n.into()),
        Variant::UI8(n) => Value::UInt(n),
        Variant::R4(x) => Value::Float(x.into()),
        Variant::R8(x) => Value::Float(x),
        Variant::Bool(b) => Value::Bool(b),
        Variant::Array(items) => Value::Array(items.into_iter().map(to_value).collect()),
        // Embedded instances are reported by class name.
        Variant::Object(object) => object
            .get_property("__CLASS")
            .map(to_value)
            .unwrap_or(Value::Null),
        Variant::Unknown(unknown) => Value::String(format!("{:?}", unknown)),
    }
}

impl NamedProperties for ManagementObject {
    fn get(&self, name: &str) -> Result<Value, BackendError> {
        self.inner.get_property(name).map(to_value).map_err(backend_error)
    }

    fn property_names(&self) -> Result<Vec<String>, BackendError> {
        self.inner.list_properties().map_err(backend_error)
    }
}

impl Backend for WmiBackend {
    type Runtime = ComRuntime;
    type Locator = Locator;
    type Dispatch = Dispatch;
    type Service = Service;
    type ResultSet = QueryResults;
    type Enumerator = ResultEnumerator;
    type Item = ManagementObject;

    fn initialize(&self) -> Result<ComRuntime, BackendError> {
        let status = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        if !is_tolerated_init_status(status.0) {
            return Err(BackendError::with_code(status.0, status.message().to_string()));
        }
        if status.0 == S_FALSE {
            debug!("COM already initialized on this thread");
        }
        Ok(ComRuntime {
            _thread_bound: PhantomData,
        })
    }

    fn create_locator(&self, _runtime: &ComRuntime) -> Result<Option<Locator>, BackendError> {
        let created: windows::core::Result<IUnknown> =
            unsafe { CoCreateInstance(&WbemLocator, None, CLSCTX_INPROC_SERVER) };
        match created {
            Ok(unknown) => Ok(Some(Locator { unknown })),
            // A success status with a null object comes back as E_POINTER.
            Err(err) if err.code() == E_POINTER => Ok(None),
            Err(err) => Err(native_error(err)),
        }
    }

    fn dispatch(&self, locator: &Locator) -> Result<Dispatch, BackendError> {
        let locator = locator.unknown.cast::<IWbemLocator>().map_err(native_error)?;
        Ok(Dispatch { locator })
    }

    fn connect(&self, dispatch: &Dispatch, args: &ConnectionArgs) -> Result<Service, BackendError> {
        let params = ConnectServerArgs::from_args(args)?;
        debug!(
            resource = %params.resource,
            user = params.user.as_deref().unwrap_or(""),
            locale = params.locale.as_deref().unwrap_or(""),
            authority = params.authority.as_deref().unwrap_or(""),
            security_flags = params.security_flags,
            "connecting"
        );

        let services = unsafe {
            dispatch.locator.ConnectServer(
                &BSTR::from(params.resource.as_str()),
                &optional_bstr(params.user.as_deref()),
                &optional_bstr(params.password.as_deref()),
                &optional_bstr(params.locale.as_deref()),
                params.security_flags,
                &optional_bstr(params.authority.as_deref()),
                None,
            )
        }
        .map_err(native_error)?;

        unsafe {
            CoSetProxyBlanket(
                &services,
                RPC_C_AUTHN_WINNT,
                RPC_C_AUTHZ_NONE,
                None,
                RPC_C_AUTHN_LEVEL_CALL,
                RPC_C_IMP_LEVEL_IMPERSONATE,
                None,
                EOAC_NONE,
            )
        }
        .map_err(native_error)?;

        Ok(Service { services })
    }

    fn exec_query(&self, service: &Service, query: &str) -> Result<QueryResults, BackendError> {
        let enumerator = unsafe {
            service.services.ExecQuery(
                &BSTR::from("WQL"),
                &BSTR::from(query),
                WBEM_FLAG_FORWARD_ONLY | WBEM_FLAG_RETURN_IMMEDIATELY,
                None,
            )
        }
        .map_err(native_error)?;
        Ok(QueryResults {
            enumerator: Some(enumerator),
        })
    }

    fn enumerate(&self, results: &mut QueryResults) -> Result<Option<ResultEnumerator>, BackendError> {
        Ok(results.enumerator.take().map(|inner| ResultEnumerator { inner }))
    }

    fn next_item(&self, enumerator: &mut ResultEnumerator) -> Result<Option<ManagementObject>, BackendError> {
        let mut row = [None];
        let mut returned = 0u32;
        unsafe { enumerator.inner.Next(WBEM_INFINITE, &mut row, &mut returned) }
            .ok()
            .map_err(native_error)?;

        if returned == 0 {
            return Ok(None);
        }
        Ok(row[0].take().map(|object| ManagementObject {
            inner: IWbemClassWrapper::new(object),
        }))
    }
}
