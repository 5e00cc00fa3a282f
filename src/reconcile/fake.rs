//! In-memory control plane used by the reconciliation tests.
//!
//! Mutations are applied when submitted and reported through pending
//! operations that complete after a configurable number of polls. Public IP
//! back-references are maintained the way the real control plane does when
//! an interface is updated or deleted.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use url::Url;

use crate::arm::model::{
    InstanceIds, NetworkInterface, PublicIpAddress, SubResource, VirtualMachine,
    VirtualMachineScaleSet,
};
use crate::arm::{ArmError, NetworkInterfaces, PublicIpAddresses, ScaleSets, VirtualMachines};
use crate::lro::{NoContent, Operation, OperationPoller, PollMode, PollStatus, PollTarget};
use crate::resource::short_name;

const PREFIX: &str = "/subscriptions/sub-1/resourceGroups/rg-1/providers";

pub fn public_ip_id(name: &str) -> String {
    format!("{PREFIX}/Microsoft.Network/publicIPAddresses/{name}")
}

pub fn interface_id(name: &str) -> String {
    format!("{PREFIX}/Microsoft.Network/networkInterfaces/{name}")
}

pub fn ip_configuration_id(nic: &str) -> String {
    format!("{}/ipConfigurations/ipconfig1", interface_id(nic))
}

pub fn standalone_provider_id(vm: &str) -> String {
    format!("azure://{PREFIX}/Microsoft.Compute/virtualMachines/{vm}")
}

pub fn scale_set_provider_id(scale_set: &str, instance: u32) -> String {
    format!("azure://{PREFIX}/Microsoft.Compute/virtualMachineScaleSets/{scale_set}/virtualMachines/{instance}")
}

/// A VM whose only interface is `nic`.
pub fn virtual_machine(name: &str, nic: &str) -> VirtualMachine {
    serde_json::from_value(json!({
        "id": format!("{PREFIX}/Microsoft.Compute/virtualMachines/{name}"),
        "name": name,
        "properties": {
            "hardwareProfile": { "vmSize": "Standard_D2s_v3" },
            "networkProfile": { "networkInterfaces": [{ "id": interface_id(nic) }] }
        }
    }))
    .unwrap()
}

/// An interface with a single private IP configuration.
pub fn network_interface(name: &str) -> NetworkInterface {
    serde_json::from_value(json!({
        "id": interface_id(name),
        "name": name,
        "location": "westeurope",
        "properties": {
            "ipConfigurations": [{
                "id": ip_configuration_id(name),
                "name": "ipconfig1",
                "properties": {
                    "privateIPAddress": "10.240.0.4",
                    "subnet": { "id": format!("{PREFIX}/Microsoft.Network/virtualNetworks/vnet/subnets/default") }
                }
            }]
        }
    }))
    .unwrap()
}

/// A scale set with one interface configuration and one IP configuration.
pub fn scale_set(name: &str) -> VirtualMachineScaleSet {
    serde_json::from_value(json!({
        "id": format!("{PREFIX}/Microsoft.Compute/virtualMachineScaleSets/{name}"),
        "name": name,
        "location": "westeurope",
        "sku": { "name": "Standard_D2s_v3", "capacity": 3 },
        "properties": {
            "upgradePolicy": { "mode": "Manual" },
            "virtualMachineProfile": {
                "networkProfile": {
                    "networkInterfaceConfigurations": [{
                        "name": "nic",
                        "properties": {
                            "primary": true,
                            "ipConfigurations": [{
                                "name": "ipconfig1",
                                "properties": { "subnet": { "id": "/subnets/default" } }
                            }]
                        }
                    }]
                }
            }
        }
    }))
    .unwrap()
}

/// Control-plane calls, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetPublicIp,
    PutPublicIp,
    DeletePublicIp,
    GetInterface,
    PutInterface,
    DeleteInterface,
    GetVirtualMachine,
    GetScaleSet,
    PutScaleSet,
    UpdateInstances,
}

impl Op {
    fn method(self) -> Method {
        match self {
            Self::PutPublicIp | Self::PutInterface | Self::PutScaleSet => Method::PUT,
            Self::DeletePublicIp | Self::DeleteInterface => Method::DELETE,
            Self::UpdateInstances => Method::POST,
            _ => Method::GET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub name: String,
}

/// Injected failure for every call of one kind.
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    /// Rejected at submission with the given status.
    Reject(StatusCode),
    /// Accepted, then reported failed when polled. Nothing is applied.
    OperationFailed,
    /// Accepted, then reported as not found when polled.
    OperationNotFound,
    /// Rejected with a 404 naming the resource group rather than the resource.
    ScopeNotFound,
}

impl Failure {
    fn rejection(self) -> ArmError {
        match self {
            Self::Reject(status) if status == StatusCode::NOT_FOUND => {
                ArmError::not_found("ResourceNotFound", "injected not found")
            }
            Self::Reject(status) => ArmError::Status {
                status,
                code: "InjectedFailure".to_string(),
                message: "injected rejection".to_string(),
            },
            Self::OperationFailed => ArmError::OperationFailed {
                status: "Failed".to_string(),
                code: "InternalServerError".to_string(),
                message: "injected operation failure".to_string(),
            },
            Self::OperationNotFound => ArmError::OperationFailed {
                status: "Failed".to_string(),
                code: "NotFound".to_string(),
                message: "resource disappeared".to_string(),
            },
            Self::ScopeNotFound => ArmError::Status {
                status: StatusCode::NOT_FOUND,
                code: "ResourceGroupNotFound".to_string(),
                message: "resource group 'rg' could not be found".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct Resources {
    pub public_ips: BTreeMap<String, PublicIpAddress>,
    pub interfaces: BTreeMap<String, NetworkInterface>,
    pub virtual_machines: BTreeMap<String, VirtualMachine>,
    pub scale_sets: BTreeMap<String, VirtualMachineScaleSet>,
    pub instance_updates: Vec<(String, InstanceIds)>,
}

type Hook = Box<dyn FnOnce(&mut Resources) + Send>;

struct PendingOp {
    remaining: u32,
    outcome: Result<Option<Value>, Failure>,
}

#[derive(Default)]
struct State {
    resources: Resources,
    calls: Vec<Call>,
    failures: HashMap<Op, Failure>,
    hooks: Vec<(Op, Hook)>,
    operations: HashMap<u64, PendingOp>,
    next_operation: u64,
    pending_rounds: u32,
}

impl State {
    fn record(&mut self, op: Op, name: &str) {
        self.calls.push(Call {
            op,
            name: name.to_string(),
        });
    }

    fn run_hooks(&mut self, op: Op) {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.hooks)
            .into_iter()
            .partition(|(hook_op, _)| *hook_op == op);
        self.hooks = rest;
        for (_, hook) in due {
            hook(&mut self.resources);
        }
    }
}

pub struct FakeCloud {
    state: Mutex<State>,
}

impl FakeCloud {
    /// An empty cloud whose operations complete after one poll.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                pending_rounds: 1,
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_standalone_vm(self, vm: &str, nic: &str) -> Self {
        self.seed(|r| {
            r.virtual_machines
                .insert(vm.to_string(), virtual_machine(vm, nic));
            r.interfaces.insert(nic.to_string(), network_interface(nic));
        })
    }

    /// Adds an IP, optionally attached to `nic` in both directions.
    pub fn with_public_ip(self, name: &str, attached_to: Option<&str>) -> Self {
        self.seed(|r| {
            let mut ip = PublicIpAddress::dynamic_ipv4(name, "westeurope");
            ip.id = Some(public_ip_id(name));
            if let Some(nic) = attached_to {
                ip.properties.get_or_insert_with(Default::default).ip_configuration =
                    Some(SubResource::new(ip_configuration_id(nic)));
                if let Some(config) = r
                    .interfaces
                    .get_mut(nic)
                    .and_then(NetworkInterface::primary_ip_configuration_mut)
                {
                    config.set_public_ip(Some(SubResource::new(public_ip_id(name))));
                }
            }
            r.public_ips.insert(name.to_string(), ip);
        })
    }

    pub fn with_scale_set(self, model: VirtualMachineScaleSet) -> Self {
        self.seed(|r| {
            let name = model.name.clone().unwrap_or_default();
            r.scale_sets.insert(name, model);
        })
    }

    /// Direct access to stored resources.
    pub fn seed(self, f: impl FnOnce(&mut Resources)) -> Self {
        f(&mut self.lock().resources);
        self
    }

    /// Every later call of `op` fails with `failure`.
    pub fn fail(&self, op: Op, failure: Failure) {
        self.lock().failures.insert(op, failure);
    }

    /// Runs `hook` once, right after the next successful `op` is applied.
    pub fn after(&self, op: Op, hook: impl FnOnce(&mut Resources) + Send + 'static) {
        self.lock().hooks.push((op, Box::new(hook)));
    }

    /// Number of in-progress polls before each operation completes; 0 completes synchronously.
    pub fn set_pending_rounds(&self, rounds: u32) {
        self.lock().pending_rounds = rounds;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.lock().calls.iter().map(|c| c.op).collect()
    }

    /// Calls other than reads.
    pub fn mutations(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| op.method() != Method::GET)
            .collect()
    }

    pub fn public_ip(&self, name: &str) -> Option<PublicIpAddress> {
        self.lock().resources.public_ips.get(name).cloned()
    }

    pub fn interface(&self, name: &str) -> Option<NetworkInterface> {
        self.lock().resources.interfaces.get(name).cloned()
    }

    pub fn scale_set(&self, name: &str) -> Option<VirtualMachineScaleSet> {
        self.lock().resources.scale_sets.get(name).cloned()
    }

    pub fn instance_updates(&self) -> Vec<(String, InstanceIds)> {
        self.lock().resources.instance_updates.clone()
    }

    pub fn open_operations(&self) -> usize {
        self.lock().operations.len()
    }

    fn get<T: Clone>(
        &self,
        op: Op,
        name: &str,
        select: impl FnOnce(&Resources) -> Option<&T>,
    ) -> Result<T, ArmError> {
        let mut state = self.lock();
        state.record(op, name);
        if let Some(failure) = state.failures.get(&op) {
            return Err(failure.rejection());
        }
        select(&state.resources)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    fn submit<T: Serialize>(
        &self,
        op: Op,
        name: &str,
        apply: impl FnOnce(&mut Resources) -> Result<Option<T>, ArmError>,
    ) -> Result<Operation<T>, ArmError> {
        let mut state = self.lock();
        state.record(op, name);

        let outcome = match state.failures.get(&op).copied() {
            Some(failure @ (Failure::Reject(_) | Failure::ScopeNotFound)) => {
                return Err(failure.rejection());
            }
            Some(failure) => Err(failure),
            None => {
                let result = apply(&mut state.resources)?;
                state.run_hooks(op);
                if state.pending_rounds == 0 {
                    return Ok(Operation::done(result));
                }
                Ok(result.map(|r| serde_json::to_value(r).unwrap()))
            }
        };

        let id = state.next_operation;
        state.next_operation += 1;
        let remaining = state.pending_rounds;
        state.operations.insert(id, PendingOp { remaining, outcome });

        Ok(Operation::pending(PollTarget {
            mode: PollMode::AsyncOperation,
            status_url: Url::parse(&format!("https://fake.invalid/operations/{id}")).unwrap(),
            resource_url: Url::parse(&format!("https://fake.invalid/resources/{name}")).unwrap(),
            method: op.method(),
            retry_after: None,
        }))
    }
}

fn not_found(name: &str) -> ArmError {
    ArmError::not_found("ResourceNotFound", format!("'{name}' was not found"))
}

fn bad_request(code: &str) -> ArmError {
    ArmError::Status {
        status: StatusCode::BAD_REQUEST,
        code: code.to_string(),
        message: code.to_string(),
    }
}

/// Points every public IP referenced by `nic` back at its configuration and
/// clears stale back-references into `nic`.
fn link_public_ips(r: &mut Resources, nic: &NetworkInterface) -> Result<(), ArmError> {
    let links: Vec<(Option<String>, Option<String>)> = nic
        .properties
        .iter()
        .flat_map(|p| p.ip_configurations.iter())
        .map(|c| (c.id.clone(), c.public_ip_id().map(str::to_string)))
        .collect();

    if links
        .iter()
        .filter_map(|(_, ip)| ip.as_deref())
        .any(|ip| !r.public_ips.contains_key(short_name(ip)))
    {
        return Err(bad_request("InvalidResourceReference"));
    }

    unlink_interface(r, nic.id.as_deref().unwrap_or_default());
    for (config_id, ip_id) in links {
        let (Some(config_id), Some(ip_id)) = (config_id, ip_id) else {
            continue;
        };
        if let Some(ip) = r.public_ips.get_mut(short_name(&ip_id)) {
            ip.properties.get_or_insert_with(Default::default).ip_configuration =
                Some(SubResource::new(config_id));
        }
    }
    Ok(())
}

fn unlink_interface(r: &mut Resources, nic_id: &str) {
    let prefix = format!("{nic_id}/");
    for ip in r.public_ips.values_mut() {
        if ip.ip_configuration_id().is_some_and(|id| id.starts_with(&prefix)) {
            if let Some(props) = ip.properties.as_mut() {
                props.ip_configuration = None;
            }
        }
    }
}

impl OperationPoller for FakeCloud {
    async fn poll(&self, target: &PollTarget) -> Result<PollStatus, ArmError> {
        let id: u64 = short_name(target.status_url.path()).parse().unwrap();
        let mut state = self.lock();
        let pending = state.operations.get_mut(&id).unwrap();
        if pending.remaining > 0 {
            pending.remaining -= 1;
            return Ok(PollStatus::InProgress { retry_after: None });
        }

        let pending = state.operations.remove(&id).unwrap();
        match pending.outcome {
            Ok(value) => Ok(PollStatus::Succeeded(value)),
            Err(failure) => Err(failure.rejection()),
        }
    }
}

impl PublicIpAddresses for FakeCloud {
    async fn get_public_ip(&self, name: &str) -> Result<PublicIpAddress, ArmError> {
        self.get(Op::GetPublicIp, name, |r| r.public_ips.get(name))
    }

    async fn create_or_update_public_ip(
        &self,
        name: &str,
        public_ip: &PublicIpAddress,
    ) -> Result<Operation<PublicIpAddress>, ArmError> {
        self.submit(Op::PutPublicIp, name, |r| {
            let mut ip = public_ip.clone();
            ip.id = Some(public_ip_id(name));
            let existing = r
                .public_ips
                .get(name)
                .and_then(|old| old.properties.as_ref())
                .and_then(|p| p.ip_configuration.clone());
            let props = ip.properties.get_or_insert_with(Default::default);
            props.provisioning_state = Some("Succeeded".to_string());
            props.ip_configuration = existing;
            r.public_ips.insert(name.to_string(), ip.clone());
            Ok(Some(ip))
        })
    }

    async fn delete_public_ip(&self, name: &str) -> Result<Operation<NoContent>, ArmError> {
        self.submit(Op::DeletePublicIp, name, |r| match r.public_ips.get(name) {
            None => Err(not_found(name)),
            Some(ip) if ip.ip_configuration_id().is_some() => {
                Err(bad_request("PublicIPAddressInUse"))
            }
            Some(_) => {
                r.public_ips.remove(name);
                Ok(None::<NoContent>)
            }
        })
    }
}

impl NetworkInterfaces for FakeCloud {
    async fn get_interface(&self, name: &str) -> Result<NetworkInterface, ArmError> {
        self.get(Op::GetInterface, name, |r| r.interfaces.get(name))
    }

    async fn create_or_update_interface(
        &self,
        name: &str,
        interface: &NetworkInterface,
    ) -> Result<Operation<NetworkInterface>, ArmError> {
        self.submit(Op::PutInterface, name, |r| {
            if !r.interfaces.contains_key(name) {
                return Err(not_found(name));
            }
            let mut nic = interface.clone();
            nic.id = Some(interface_id(name));
            link_public_ips(r, &nic)?;
            r.interfaces.insert(name.to_string(), nic.clone());
            Ok(Some(nic))
        })
    }

    async fn delete_interface(&self, name: &str) -> Result<Operation<NoContent>, ArmError> {
        self.submit(Op::DeleteInterface, name, |r| {
            if r.interfaces.remove(name).is_none() {
                return Err(not_found(name));
            }
            unlink_interface(r, &interface_id(name));
            Ok(None::<NoContent>)
        })
    }
}

impl VirtualMachines for FakeCloud {
    async fn get_virtual_machine(&self, name: &str) -> Result<VirtualMachine, ArmError> {
        self.get(Op::GetVirtualMachine, name, |r| r.virtual_machines.get(name))
    }
}

impl ScaleSets for FakeCloud {
    async fn get_scale_set(&self, name: &str) -> Result<VirtualMachineScaleSet, ArmError> {
        self.get(Op::GetScaleSet, name, |r| r.scale_sets.get(name))
    }

    async fn create_or_update_scale_set(
        &self,
        name: &str,
        scale_set: &VirtualMachineScaleSet,
    ) -> Result<Operation<VirtualMachineScaleSet>, ArmError> {
        self.submit(Op::PutScaleSet, name, |r| {
            r.scale_sets.insert(name.to_string(), scale_set.clone());
            Ok(Some(scale_set.clone()))
        })
    }

    async fn update_scale_set_instances(
        &self,
        name: &str,
        instances: &InstanceIds,
    ) -> Result<Operation<NoContent>, ArmError> {
        self.submit(Op::UpdateInstances, name, |r| {
            if !r.scale_sets.contains_key(name) {
                return Err(not_found(name));
            }
            r.instance_updates
                .push((name.to_string(), instances.clone()));
            Ok(None::<NoContent>)
        })
    }
}
